//! Unit tests for vsl-core primitives.

#[cfg(test)]
mod ids {
    use crate::{EdgeIdx, NodeIdx, VehicleId};

    #[test]
    fn index_roundtrip() {
        let id = EdgeIdx(42);
        assert_eq!(id.index(), 42);
        assert_eq!(EdgeIdx::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(EdgeIdx::INVALID.0, u32::MAX);
        assert_eq!(NodeIdx::default(), NodeIdx::INVALID);
    }

    #[test]
    fn display() {
        assert_eq!(EdgeIdx(7).to_string(), "EdgeIdx(7)");
        assert_eq!(VehicleId::from("truck-3").to_string(), "truck-3");
    }
}

#[cfg(test)]
mod geo {
    use crate::{GeoFix, PlanarPoint};

    #[test]
    fn planar_arithmetic() {
        let a = PlanarPoint::new(1.0, 2.0);
        let b = PlanarPoint::new(4.0, 6.0);
        assert_eq!(b - a, PlanarPoint::new(3.0, 4.0));
        assert_eq!(a + b, PlanarPoint::new(5.0, 8.0));
        assert_eq!((b - a).norm(), 5.0);
        assert_eq!(a.distance(b), 5.0);
        assert_eq!(a.dot(b), 16.0);
        assert_eq!(a * 2.0, PlanarPoint::new(2.0, 4.0));
    }

    #[test]
    fn fix_position_is_lon_lat() {
        let fix = GeoFix::new("v1", 26.1, 44.4, 50.0);
        let p = fix.position();
        assert_eq!(p.lon, 26.1);
        assert_eq!(p.lat, 44.4);
        assert_eq!(fix.vehicle_id.as_str(), "v1");
    }
}

#[cfg(test)]
mod units {
    use crate::{kmh_to_mps, mps_to_kmh};

    #[test]
    fn conversions_invert() {
        assert!((kmh_to_mps(36.0) - 10.0).abs() < 1e-12);
        assert!((mps_to_kmh(10.0) - 36.0).abs() < 1e-12);
        assert!((mps_to_kmh(kmh_to_mps(53.0)) - 53.0).abs() < 1e-9);
    }
}

#[cfg(test)]
mod rng {
    use crate::{VehicleId, VehicleRng};

    #[test]
    fn same_vehicle_same_stream() {
        let v = VehicleId::from("veh-1");
        let mut a = VehicleRng::new(42, &v);
        let mut b = VehicleRng::new(42, &v);
        let xs: Vec<u32> = (0..8).map(|_| a.gen_range(0..1_000)).collect();
        let ys: Vec<u32> = (0..8).map(|_| b.gen_range(0..1_000)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn different_vehicles_diverge() {
        let mut a = VehicleRng::new(42, &VehicleId::from("veh-1"));
        let mut b = VehicleRng::new(42, &VehicleId::from("veh-2"));
        let xs: Vec<u64> = (0..8).map(|_| a.gen_range(0..u64::MAX)).collect();
        let ys: Vec<u64> = (0..8).map(|_| b.gen_range(0..u64::MAX)).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn choose_empty_is_none() {
        let mut r = VehicleRng::new(1, &VehicleId::from("x"));
        let empty: [u8; 0] = [];
        assert!(r.choose(&empty).is_none());
        assert_eq!(r.choose(&[9]), Some(&9));
    }
}

#[cfg(test)]
mod config {
    use crate::{CoreError, FailurePolicy, SpeedGrid, SweepConfig};

    #[test]
    fn default_grid_matches_deployment() {
        let grid = SpeedGrid::default();
        assert_eq!(grid.candidates(), vec![15, 20, 25, 30, 35, 40, 45, 50, 55, 60]);
        assert_eq!(grid.len(), 10);
    }

    #[test]
    fn grid_upper_not_on_step_is_excluded() {
        let grid = SpeedGrid::new(10, 24, 5).unwrap();
        assert_eq!(grid.candidates(), vec![10, 15, 20]);
    }

    #[test]
    fn single_point_grid() {
        let grid = SpeedGrid::new(30, 30, 5).unwrap();
        assert_eq!(grid.candidates(), vec![30]);
    }

    #[test]
    fn invalid_grids_rejected() {
        assert!(matches!(SpeedGrid::new(60, 15, 5), Err(CoreError::InvalidGrid { .. })));
        assert!(matches!(SpeedGrid::new(15, 60, 0), Err(CoreError::InvalidGrid { .. })));
        assert!(matches!(SpeedGrid::new(0, 60, 5), Err(CoreError::InvalidGrid { .. })));
    }

    #[test]
    fn default_config_is_valid() {
        SweepConfig::default().validate().unwrap();
    }

    #[test]
    fn bad_fields_rejected() {
        let mut cfg = SweepConfig::default();
        cfg.departure.decel_mps2 = 0.0;
        assert!(matches!(cfg.validate(), Err(CoreError::Config(_))));

        let mut cfg = SweepConfig::default();
        cfg.horizon_secs = -1.0;
        assert!(cfg.validate().is_err());

        let mut cfg = SweepConfig::default();
        cfg.max_workers = Some(0);
        assert!(cfg.validate().is_err());

        let mut cfg = SweepConfig::default();
        cfg.failure_policy = FailurePolicy::Penalize { cost_secs: f64::NAN };
        assert!(cfg.validate().is_err());

        let mut cfg = SweepConfig::default();
        cfg.matching.max_match_distance_m = Some(0.0);
        assert!(cfg.validate().is_err());
    }
}
