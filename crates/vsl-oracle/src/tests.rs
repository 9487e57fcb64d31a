//! Unit tests for vsl-oracle.

// ── SimulationOutcome ─────────────────────────────────────────────────────────

#[cfg(test)]
mod outcome {
    use crate::SimulationOutcome;

    #[test]
    fn empty_has_no_wait() {
        let o = SimulationOutcome::empty(25);
        assert_eq!(o.cap_kmh, 25);
        assert_eq!(o.arrived, 0);
        assert_eq!(o.total_wait(), 0.0);
        assert!(o.is_empty());
    }

    #[test]
    fn total_wait_sums() {
        let o = SimulationOutcome { cap_kmh: 30, waiting_times_s: vec![1.5, 0.0, 2.5], arrived: 3 };
        assert_eq!(o.total_wait(), 4.0);
        assert!(!o.is_empty());
    }
}

// ── Tripinfo ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tripinfo {
    use crate::{parse_tripinfo, read_tripinfo, OracleError};

    const TRIPS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<tripinfos xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
    <tripinfo id="veh_a" depart="0.00" arrival="41.00" duration="41.00" waitingTime="3.00" waitingCount="1"/>
    <tripinfo id="veh_b" depart="0.00" arrival="58.00" duration="58.00" waitingTime="12.50" waitingCount="2"/>
    <tripinfo id="veh_c" depart="0.00" arrival="20.00" duration="20.00">
        <emissions CO2_abs="0"/>
    </tripinfo>
</tripinfos>
"#;

    #[test]
    fn counts_arrivals_and_waits() {
        let o = parse_tripinfo(TRIPS, 40).unwrap();
        assert_eq!(o.cap_kmh, 40);
        assert_eq!(o.arrived, 3);
        assert_eq!(o.waiting_times_s, vec![3.0, 12.5]);
        assert_eq!(o.total_wait(), 15.5);
    }

    #[test]
    fn empty_root_is_zero_trips() {
        let o = parse_tripinfo("<tripinfos/>", 15).unwrap();
        assert!(o.is_empty());
    }

    #[test]
    fn truncated_document_rejected() {
        let cut = &TRIPS[..TRIPS.find("veh_c").unwrap()];
        let err = parse_tripinfo(cut, 15).unwrap_err();
        assert!(matches!(err, OracleError::Tripinfo(_)));
    }

    #[test]
    fn empty_document_rejected() {
        assert!(parse_tripinfo("", 15).is_err());
    }

    #[test]
    fn bad_waiting_time_rejected() {
        let xml = r#"<tripinfos><tripinfo id="x" waitingTime="soon"/></tripinfos>"#;
        assert!(parse_tripinfo(xml, 15).is_err());
        let xml = r#"<tripinfos><tripinfo id="x" waitingTime="-1"/></tripinfos>"#;
        assert!(parse_tripinfo(xml, 15).is_err());
    }

    #[test]
    fn missing_file_is_missing_output() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_tripinfo(&dir.path().join("nope.xml"), 20).unwrap_err();
        assert!(matches!(err, OracleError::MissingOutput(_)));
    }

    #[test]
    fn truncated_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tripinfo_sim_20.xml");
        std::fs::write(&path, "<tripinfos><tripinfo waitingTime=\"4\"/>").unwrap();
        let err = read_tripinfo(&path, 20).unwrap_err();
        assert!(matches!(err, OracleError::Tripinfo(_)));
    }

    #[test]
    fn good_file_reads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tripinfo_sim_40.xml");
        std::fs::write(&path, TRIPS).unwrap();
        assert_eq!(read_tripinfo(&path, 40).unwrap().arrived, 3);
    }
}

// ── Leases ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod lease {
    use rustc_hash::FxHashSet;

    use crate::{LeaseAllocator, PortAllocator};

    #[test]
    fn ports_never_repeat() {
        let ports = PortAllocator::new();
        let mut seen = FxHashSet::default();
        for _ in 0..32 {
            let p = ports.acquire().unwrap();
            assert!(seen.insert(p), "port {p} issued twice");
            ports.release(p);
        }
        assert_eq!(ports.issued(), 32);
        assert_eq!(ports.live(), 0);
    }

    #[test]
    fn leases_are_disjoint() {
        let dir = tempfile::tempdir().unwrap();
        let alloc = LeaseAllocator::new(dir.path(), true).unwrap();
        let leases: Vec<_> = (15..=60).step_by(5).map(|c| alloc.lease(c).unwrap()).collect();

        let ports: FxHashSet<_> = leases.iter().map(|l| l.port).collect();
        let routes: FxHashSet<_> = leases.iter().map(|l| l.route_file.clone()).collect();
        let trips: FxHashSet<_> = leases.iter().map(|l| l.tripinfo_file.clone()).collect();
        assert_eq!(ports.len(), leases.len());
        assert_eq!(routes.len(), leases.len());
        assert_eq!(trips.len(), leases.len());
        assert!(routes.is_disjoint(&trips));
        assert_eq!(alloc.ports().live(), 10);

        let l = &leases[2];
        assert_eq!(l.cap_kmh, 25);
        assert!(l.route_file.ends_with("routes_sim_25.rou.xml"));
        assert!(l.tripinfo_file.ends_with("tripinfo_sim_25.xml"));

        drop(leases);
        assert_eq!(alloc.ports().live(), 0);
    }

    #[test]
    fn drop_removes_files_unless_kept() {
        let dir = tempfile::tempdir().unwrap();

        let discard = LeaseAllocator::new(dir.path().join("discard"), false).unwrap();
        let lease = discard.lease(30).unwrap();
        std::fs::write(&lease.route_file, "<routes/>").unwrap();
        std::fs::write(&lease.tripinfo_file, "<tripinfos/>").unwrap();
        let (route, trips) = (lease.route_file.clone(), lease.tripinfo_file.clone());
        drop(lease);
        assert!(!route.exists());
        assert!(!trips.exists());

        let keep = LeaseAllocator::new(dir.path().join("keep"), true).unwrap();
        let lease = keep.lease(30).unwrap();
        assert!(lease.keeps_artifacts());
        std::fs::write(&lease.route_file, "<routes/>").unwrap();
        let route = lease.route_file.clone();
        drop(lease);
        assert!(route.exists());
    }

    #[test]
    fn stale_tripinfo_removed_on_lease() {
        let dir = tempfile::tempdir().unwrap();
        let stale = dir.path().join("tripinfo_sim_45.xml");
        std::fs::write(&stale, "<tripinfos><tripinfo waitingTime=\"1\"/></tripinfos>").unwrap();

        let alloc = LeaseAllocator::new(dir.path(), true).unwrap();
        let lease = alloc.lease(45).unwrap();
        assert_eq!(lease.tripinfo_file, stale);
        assert!(!stale.exists());
    }

    #[test]
    fn creates_work_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let alloc = LeaseAllocator::new(&nested, true).unwrap();
        assert!(nested.is_dir());
        assert_eq!(alloc.work_dir(), nested.as_path());
    }
}

// ── TraCI ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod traci {
    use std::io::{Read, Write};
    use std::net::{Ipv4Addr, TcpListener, TcpStream};
    use std::thread;
    use std::time::Duration;

    use crate::traci::{encode_message, is_disconnect, CMD_CLOSE, CMD_SIMSTEP};
    use crate::{OracleError, TraciClient};

    /// Read one request; return its command id and payload.
    fn read_request(stream: &mut TcpStream) -> (u8, Vec<u8>) {
        let mut len = [0u8; 4];
        stream.read_exact(&mut len).unwrap();
        let mut body = vec![0u8; u32::from_be_bytes(len) as usize - 4];
        stream.read_exact(&mut body).unwrap();
        (body[1], body[2..].to_vec())
    }

    fn status(command: u8, result: u8, description: &str, trailer: &[u8]) -> Vec<u8> {
        let mut cmd = vec![(7 + description.len()) as u8, command, result];
        cmd.extend_from_slice(&(description.len() as u32).to_be_bytes());
        cmd.extend_from_slice(description.as_bytes());
        cmd.extend_from_slice(trailer);
        let mut msg = ((cmd.len() + 4) as u32).to_be_bytes().to_vec();
        msg.extend_from_slice(&cmd);
        msg
    }

    /// Accept one client and answer each scripted request in order.
    fn fake_sumo(replies: Vec<Vec<u8>>) -> (u16, thread::JoinHandle<Vec<(u8, Vec<u8>)>>) {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut seen = Vec::new();
            for reply in replies {
                seen.push(read_request(&mut stream));
                stream.write_all(&reply).unwrap();
            }
            seen
        });
        (port, handle)
    }

    #[test]
    fn short_frame() {
        let msg = encode_message(CMD_SIMSTEP, &3600f64.to_be_bytes());
        assert_eq!(&msg[..4], &15u32.to_be_bytes());
        assert_eq!(msg[4], 10);
        assert_eq!(msg[5], CMD_SIMSTEP);
        assert_eq!(&msg[6..], &3600f64.to_be_bytes());
    }

    #[test]
    fn long_frame() {
        let payload = vec![7u8; 300];
        let msg = encode_message(0x55, &payload);
        assert_eq!(&msg[..4], &310u32.to_be_bytes());
        assert_eq!(msg[4], 0);
        assert_eq!(&msg[5..9], &306u32.to_be_bytes());
        assert_eq!(msg[9], 0x55);
        assert_eq!(msg.len(), 310);
    }

    #[test]
    fn step_then_close() {
        let (port, server) = fake_sumo(vec![
            status(CMD_SIMSTEP, 0, "", &0u32.to_be_bytes()),
            status(CMD_CLOSE, 0, "", &[]),
        ]);
        let mut client = TraciClient::connect(port, 10, Duration::from_millis(10)).unwrap();
        client.simulation_step(3600.0).unwrap();
        client.close().unwrap();

        let seen = server.join().unwrap();
        assert_eq!(seen[0].0, CMD_SIMSTEP);
        assert_eq!(seen[0].1, 3600f64.to_be_bytes().to_vec());
        assert_eq!(seen[1], (CMD_CLOSE, vec![]));
    }

    #[test]
    fn error_status_surfaces_description() {
        let (port, server) = fake_sumo(vec![status(CMD_SIMSTEP, 0xFF, "boom", &[])]);
        let mut client = TraciClient::connect(port, 10, Duration::from_millis(10)).unwrap();
        match client.simulation_step(10.0) {
            Err(OracleError::Command { command, message }) => {
                assert_eq!(command, CMD_SIMSTEP);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected {other:?}"),
        }
        server.join().unwrap();
    }

    #[test]
    fn mismatched_status_is_protocol_error() {
        let (port, server) = fake_sumo(vec![status(CMD_CLOSE, 0, "", &[])]);
        let mut client = TraciClient::connect(port, 10, Duration::from_millis(10)).unwrap();
        let err = client.simulation_step(10.0).unwrap_err();
        assert!(matches!(err, OracleError::Protocol(_)));
        server.join().unwrap();
    }

    #[test]
    fn hang_up_is_a_disconnect() {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            read_request(&mut stream);
        });
        let mut client = TraciClient::connect(port, 10, Duration::from_millis(10)).unwrap();
        let err = client.simulation_step(10.0).unwrap_err();
        assert!(is_disconnect(&err), "{err:?}");
        server.join().unwrap();
    }

    #[test]
    fn connect_gives_up() {
        // Reserve a port, then free it so nothing is listening.
        let port = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let err = TraciClient::connect(port, 3, Duration::from_millis(1)).err().unwrap();
        assert!(matches!(err, OracleError::Connect { attempts: 3, .. }));
    }
}

// ── SUMO oracle ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod sumo {
    use vsl_core::{PlanarPoint, VehicleId};
    use vsl_network::RoadNetworkBuilder;
    use vsl_route::{RouteBatch, RouteDescriptor};

    use crate::{LeaseAllocator, OracleError, SimulationOracle, SumoConfig, SumoOracle};

    #[test]
    fn defaults() {
        let cfg = SumoConfig::default();
        assert_eq!(cfg.binary, "sumo");
        assert_eq!(cfg.config_file.to_str(), Some("base.sumocfg"));
        assert_eq!(cfg.work_dir.to_str(), Some("results"));
        assert!(cfg.keep_artifacts);
        assert!(cfg.extra_args.iter().any(|a| a == "--no-step-log"));
        assert_eq!(cfg.vtype.id, "vehicle");
    }

    #[test]
    fn missing_binary_fails_after_writing_routes() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node("a");
        let c = b.add_node("c");
        let e = b.add_edge("a_c", a, c, vec![PlanarPoint::new(0.0, 0.0), PlanarPoint::new(50.0, 0.0)], None);
        let net = b.build();

        let dir = tempfile::tempdir().unwrap();
        let cfg = SumoConfig {
            binary: dir.path().join("no-such-sumo").to_string_lossy().into_owned(),
            work_dir: dir.path().to_path_buf(),
            ..SumoConfig::default()
        };
        let leases = LeaseAllocator::new(&cfg.work_dir, true).unwrap();
        let lease = leases.lease(30).unwrap();

        let mut batch = RouteBatch::new(30);
        batch.routes.push(RouteDescriptor {
            vehicle_id: VehicleId::new("v"),
            entry: e,
            exit: e,
            depart_pos_m: 10.0,
            depart_speed_mps: 5.0,
        });

        let oracle = SumoOracle::new(&net, cfg);
        let err = oracle.run(&batch, &lease, 3600.0).unwrap_err();
        assert!(matches!(err, OracleError::Spawn { .. }), "{err:?}");
        let routes = std::fs::read_to_string(&lease.route_file).unwrap();
        assert!(routes.contains(r#"<route id="route_v" edges="a_c"/>"#));
    }
}
