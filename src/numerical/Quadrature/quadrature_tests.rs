#[cfg(test)]
mod tests {
    use crate::numerical::Quadrature::{QuadratureCache, QuadratureMethod, QuadratureSet};
    use crate::numerical::errors::CollocationError;
    use approx::assert_relative_eq;
    use nalgebra::DVector;
    use std::sync::Arc;
    use strum::IntoEnumIterator;

    fn round3(v: &DVector<f64>) -> Vec<f64> {
        v.iter().map(|x| (x * 1000.0).round() / 1000.0).collect()
    }

    fn rounded(values: &[f64]) -> Vec<f64> {
        values.iter().map(|x| (x * 1000.0).round() / 1000.0).collect()
    }

    #[test]
    fn test_invalid_order() {
        for method in QuadratureMethod::iter() {
            for order in [0, 1] {
                let err = QuadratureSet::generate(order, method).unwrap_err();
                assert!(matches!(err, CollocationError::InvalidOrder(o) if o == order));
            }
        }
    }

    #[test]
    fn test_parse_method() {
        assert_eq!(QuadratureMethod::parse("gauss").unwrap(), QuadratureMethod::Gauss);
        assert_eq!(QuadratureMethod::parse("Radau").unwrap(), QuadratureMethod::Radau);
        assert_eq!(QuadratureMethod::parse(" LOBATTO ").unwrap(), QuadratureMethod::Lobatto);
        let err = QuadratureMethod::parse("chebyshev").unwrap_err();
        assert!(matches!(err, CollocationError::UnsupportedScheme(name) if name == "chebyshev"));
        assert_eq!(QuadratureMethod::Radau.to_string(), "radau");
    }

    #[test]
    fn test_weights_sum_to_two() {
        for method in QuadratureMethod::iter() {
            for order in 2..20 {
                let q = QuadratureSet::generate(order, method).unwrap();
                assert_eq!(q.nodes.len(), order);
                assert_eq!(q.weights.len(), order);
                assert_relative_eq!(q.weights.sum(), 2.0, epsilon = 1e-12);
                assert_relative_eq!(q.unit_weights().sum(), 1.0, epsilon = 1e-12);
                assert!(q.nodes.iter().all(|x| (-1.0..=1.0).contains(x)));
                assert!(q.nodes.as_slice().windows(2).all(|w| w[0] < w[1]));
            }
        }
    }

    #[test]
    fn test_lobatto_endpoints() {
        for order in 2..20 {
            let q = QuadratureSet::generate(order, QuadratureMethod::Lobatto).unwrap();
            assert_eq!(q.nodes[0], -1.0);
            assert_eq!(q.nodes[order - 1], 1.0);
        }
    }

    #[test]
    fn test_lobatto_weights_fixture() {
        let q2 = QuadratureSet::generate(2, QuadratureMethod::Lobatto).unwrap();
        assert_eq!(q2.nodes.as_slice(), &[-1.0, 1.0]);
        assert_eq!(q2.unit_weights().as_slice(), &[0.5, 0.5]);
        let q3 = QuadratureSet::generate(3, QuadratureMethod::Lobatto).unwrap();
        let w3 = q3.unit_weights();
        assert_relative_eq!(w3[0], 1.0 / 6.0, epsilon = 1e-14);
        assert_relative_eq!(w3[1], 2.0 / 3.0, epsilon = 1e-14);
        assert_relative_eq!(w3[2], 1.0 / 6.0, epsilon = 1e-14);
    }

    #[test]
    fn test_radau_first_node() {
        for order in 2..20 {
            let q = QuadratureSet::generate(order, QuadratureMethod::Radau).unwrap();
            assert_eq!(q.nodes[0], -1.0);
            assert_eq!(q.nodes[order - 1], 1.0);
            assert_eq!(q.weights[order - 1], 0.0);
            assert_eq!(q.num_collocation_points(), order - 1);
        }
    }

    #[test]
    fn test_radau_weights_fixture() {
        let w3 = QuadratureSet::generate(3, QuadratureMethod::Radau).unwrap().unit_weights();
        assert_eq!(round3(&w3), rounded(&[0.25, 0.75, 0.0]));
        let w4 = QuadratureSet::generate(4, QuadratureMethod::Radau).unwrap().unit_weights();
        assert_eq!(
            round3(&w4),
            rounded(&[0.222222222222222 / 2.0, 1.02497165237684 / 2.0, 0.752806125400934 / 2.0, 0.0])
        );
        let w8 = QuadratureSet::generate(8, QuadratureMethod::Radau).unwrap().unit_weights();
        let expected8: Vec<f64> = [
            0.0408163265306122,
            0.239227489225312,
            0.380949873644231,
            0.447109829014567,
            0.424703779005956,
            0.318204231467302,
            0.148988471112020,
            0.0,
        ]
        .iter()
        .map(|w| w / 2.0)
        .collect();
        assert_eq!(round3(&w8), rounded(&expected8));
    }

    #[test]
    fn test_radau_points_fixture() {
        let p3 = QuadratureSet::generate(3, QuadratureMethod::Radau).unwrap().nodes;
        assert_eq!(round3(&p3), rounded(&[-1.0, 0.333333333333333, 1.0]));
        let p4 = QuadratureSet::generate(4, QuadratureMethod::Radau).unwrap().nodes;
        assert_eq!(round3(&p4), rounded(&[-1.0, -0.289897948556636, 0.689897948556636, 1.0]));
        let p8 = QuadratureSet::generate(8, QuadratureMethod::Radau).unwrap().nodes;
        assert_eq!(
            round3(&p8),
            rounded(&[
                -1.0,
                -0.853891342639482,
                -0.538467724060109,
                -0.117343037543100,
                0.326030619437691,
                0.703842800663031,
                0.941367145680430,
                1.0
            ])
        );
    }

    #[test]
    fn test_gauss_no_endpoints_and_exactness() {
        for order in 2..12 {
            let q = QuadratureSet::generate(order, QuadratureMethod::Gauss).unwrap();
            assert!(q.nodes.iter().all(|x| x.abs() < 1.0));
            // highest even power below the 2n - 1 exactness limit
            let power = 2 * order - 2;
            let values = q.nodes.map(|x| x.powi(power as i32) + x.powi(power as i32 + 1));
            let exact = 2.0 / (power as f64 + 1.0);
            assert_relative_eq!(q.integrate(&values).unwrap(), exact, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_gauss_matches_gauss_quad_crate() {
        let f = |x: f64| (2.0 * x).cos() + x.powi(5) - 0.5 * x * x;
        for order in [3, 6, 10] {
            let q = QuadratureSet::generate(order, QuadratureMethod::Gauss).unwrap();
            let ours = q.integrate(&q.nodes.map(f)).unwrap();
            let reference = gauss_quad::GaussLegendre::new(order)
                .unwrap()
                .integrate(-1.0, 1.0, f);
            assert_relative_eq!(ours, reference, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_differentiation_matrix_rows_sum_to_zero() {
        for method in QuadratureMethod::iter() {
            let q = QuadratureSet::generate(7, method).unwrap();
            for i in 0..q.order {
                assert!(q.D.row(i).sum().abs() < 1e-11);
            }
        }
    }

    #[test]
    fn test_differentiation_exact_for_polynomials() {
        for method in QuadratureMethod::iter() {
            let q = QuadratureSet::generate(6, method).unwrap();
            let y = q.nodes.map(|x| x.powi(5) - 2.0 * x * x + 1.0);
            let dy = &q.D * &y;
            for (i, &x) in q.nodes.iter().enumerate() {
                assert_relative_eq!(dy[i], 5.0 * x.powi(4) - 4.0 * x, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn test_integration_matrix_consistent_with_D() {
        for method in QuadratureMethod::iter() {
            for order in 2..12 {
                let q = QuadratureSet::generate(order, method).unwrap();
                let p = |x: f64| (0..order).map(|k| (k as f64 + 1.0) * x.powi(k as i32)).sum::<f64>();
                let y = q.nodes.map(p);
                let reconstructed = &q.A * (&q.D * &y);
                let y_left = p(-1.0);
                for i in 0..order {
                    assert_relative_eq!(reconstructed[i], y[i] - y_left, epsilon = 1e-8);
                }
            }
        }
    }

    #[test]
    fn test_lobatto_last_row_of_A_is_weights() {
        for order in 2..12 {
            let q = QuadratureSet::generate(order, QuadratureMethod::Lobatto).unwrap();
            for j in 0..order {
                assert_relative_eq!(q.A[(order - 1, j)], q.weights[j], epsilon = 1e-11);
            }
            // first row integrates over an empty interval
            assert!(q.A.row(0).iter().all(|a| a.abs() < 1e-13));
        }
    }

    #[test]
    fn test_nodes_on_interval() {
        let q = QuadratureSet::generate(3, QuadratureMethod::Lobatto).unwrap();
        let t = q.nodes_on(2.0, 6.0);
        assert_relative_eq!(t[0], 2.0);
        assert_relative_eq!(t[1], 4.0, epsilon = 1e-14);
        assert_relative_eq!(t[2], 6.0);
    }

    #[test]
    fn test_integrate_length_check() {
        let q = QuadratureSet::generate(4, QuadratureMethod::Gauss).unwrap();
        let err = q.integrate(&DVector::zeros(3)).unwrap_err();
        assert!(matches!(
            err,
            CollocationError::DimensionMismatch { expected: 4, found: 3, .. }
        ));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = QuadratureSet::generate(9, QuadratureMethod::Radau).unwrap();
        let b = QuadratureSet::generate(9, QuadratureMethod::Radau).unwrap();
        assert_eq!(a.nodes, b.nodes);
        assert_eq!(a.weights, b.weights);
        assert_eq!(a.D, b.D);
        assert_eq!(a.A, b.A);
    }

    #[test]
    fn test_cache_shares_sets() {
        let mut cache = QuadratureCache::new();
        assert!(cache.is_empty());
        let a = cache.get(5, QuadratureMethod::Lobatto).unwrap();
        let b = cache.get(5, QuadratureMethod::Lobatto).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        let _ = cache.get(5, QuadratureMethod::Gauss).unwrap();
        assert_eq!(cache.len(), 2);
        assert!(cache.get(1, QuadratureMethod::Gauss).is_err());
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }
}
