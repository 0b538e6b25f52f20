//! Unit tests for busim-route.
//!
//! All tests use hand-crafted polylines near the equator, where one
//! hundredth of a degree of longitude is ≈ 1.112 km.

#[cfg(test)]
mod helpers {
    use busim_core::GeoPoint;

    use crate::Route;

    /// Haversine length of 0.01° of longitude at the equator, km.
    pub const HUNDREDTH_DEG_KM: f64 = 1.111_949_266_445_587;

    /// Three points due east along the equator: 0 → 0.005° → 0.01°.
    pub fn east_route() -> Route {
        Route::new(vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 0.005),
            GeoPoint::new(0.0, 0.01),
        ])
        .unwrap()
    }

    /// Point `along_km` east of the origin and `lateral_m` north of the
    /// equator.
    pub fn beside(along_km: f64, lateral_m: f64) -> GeoPoint {
        GeoPoint::new(lateral_m / 111_320.0, along_km / HUNDREDTH_DEG_KM * 0.01)
    }

    pub fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }
}

// ── Route ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod route {
    use busim_core::GeoPoint;

    use super::helpers::{HUNDREDTH_DEG_KM, beside, close, east_route};
    use crate::Route;

    #[test]
    fn fewer_than_two_points_is_absent() {
        assert!(Route::new(vec![]).is_none());
        assert!(Route::new(vec![GeoPoint::new(0.0, 0.0)]).is_none());
    }

    #[test]
    fn total_length_is_sum_of_segments() {
        let r = east_route();
        assert_eq!(r.len(), 3);
        assert_eq!(r.last_index(), 2);
        assert!(close(r.total_length_km(), HUNDREDTH_DEG_KM, 1e-9));
        assert!(close(
            r.segment_length_km(0) + r.segment_length_km(1),
            r.total_length_km(),
            1e-12
        ));
        assert_eq!(r.cumulative_km(0), 0.0);
    }

    #[test]
    fn remaining_from_start_is_total() {
        let r = east_route();
        assert!(close(r.remaining_from(0, r.start()), r.total_length_km(), 1e-9));
    }

    #[test]
    fn remaining_from_interior_point() {
        let r = east_route();
        let rem = r.remaining_from(1, r.point(1));
        assert!(close(rem, r.segment_length_km(1), 1e-9));
    }

    #[test]
    fn remaining_mid_segment() {
        let r = east_route();
        let p = beside(0.25, 0.0);
        let rem = r.remaining_from(0, p);
        assert!(close(rem, r.total_length_km() - 0.25, 1e-6), "got {rem}");
    }

    #[test]
    fn remaining_at_last_point_is_zero() {
        let r = east_route();
        assert_eq!(r.remaining_from(2, r.end()), 0.0);
        assert_eq!(r.remaining_from(7, r.end()), 0.0);
    }

    #[test]
    fn along_at_matches_cumulative() {
        let r = east_route();
        assert!(close(r.along_at(1, r.point(1)), r.cumulative_km(1), 1e-12));
        assert!(close(r.along_at(0, beside(0.1, 0.0)), 0.1, 1e-6));
    }

    #[test]
    fn project_onto_first_segment() {
        let r = east_route();
        let proj = r.project(beside(0.2, 11.0));
        assert_eq!(proj.segment, 0);
        assert!(close(proj.along_km, 0.2, 1e-6), "along {}", proj.along_km);
        assert!(close(proj.lateral_m, 11.0, 1e-3), "lateral {}", proj.lateral_m);
    }

    #[test]
    fn project_onto_second_segment() {
        let r = east_route();
        let proj = r.project(beside(0.9, 5.0));
        assert_eq!(proj.segment, 1);
        assert!(close(proj.along_km, 0.9, 1e-6));
    }

    #[test]
    fn project_picks_nearest_leg_of_an_l_shape() {
        // East 0.01°, then north 0.01°.
        let r = Route::new(vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 0.01),
            GeoPoint::new(0.01, 0.01),
        ])
        .unwrap();
        // Just west of the northbound leg, halfway up it.
        let proj = r.project(GeoPoint::new(0.005, 0.0099));
        assert_eq!(proj.segment, 1);
        assert!(proj.along_km > r.cumulative_km(1));
        assert!(proj.lateral_m < 12.0);
    }

    #[test]
    fn locate_endpoints_and_interior() {
        let r = east_route();

        let (seg, p) = r.locate(0.0);
        assert_eq!(seg, 0);
        assert_eq!(p, r.start());

        let (seg, p) = r.locate(r.cumulative_km(1));
        assert_eq!(seg, 1);
        assert!(close(p.lon, 0.005, 1e-12));

        let (seg, p) = r.locate(r.total_length_km());
        assert_eq!(seg, 1);
        assert!(close(p.lon, 0.01, 1e-12));

        let (seg, p) = r.locate(0.25);
        assert_eq!(seg, 0);
        assert!(close(p.lon, beside(0.25, 0.0).lon, 1e-9));
    }

    #[test]
    fn locate_clamps_out_of_range() {
        let r = east_route();
        assert_eq!(r.locate(-5.0).1, r.start());
        let (seg, p) = r.locate(99.0);
        assert_eq!(seg, 1);
        assert!(close(p.lon, r.end().lon, 1e-12));
    }
}

// ── Stop extraction ───────────────────────────────────────────────────────────

#[cfg(test)]
mod stops {
    use busim_core::SimParams;

    use super::helpers::{beside, close, east_route};
    use crate::{StopCandidate, extract_stops};

    fn cand(name: &str, along_km: f64, lateral_m: f64) -> StopCandidate {
        StopCandidate::new(name, beside(along_km, lateral_m))
    }

    fn names(stops: &[crate::Stop]) -> Vec<&str> {
        stops.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn empty_candidates_give_no_stops() {
        let stops = extract_stops(&east_route(), Vec::new(), &SimParams::default());
        assert!(stops.is_empty());
    }

    #[test]
    fn close_pair_keeps_smaller_lateral_offset() {
        // 30 m apart along the route, below the 80 m minimum gap.
        let params = SimParams::default();
        for order in [[0, 1], [1, 0]] {
            let pair = [cand("near", 0.300, 10.0), cand("far", 0.330, 40.0)];
            let input: Vec<_> = order.iter().map(|&i| pair[i].clone()).collect();
            let stops = extract_stops(&east_route(), input, &params);
            assert_eq!(names(&stops), ["near"]);
            assert!(close(stops[0].lateral_m, 10.0, 1e-3));
        }
    }

    #[test]
    fn distant_candidates_are_dropped() {
        let stops = extract_stops(
            &east_route(),
            vec![cand("kept", 0.5, 59.0), cand("too far", 0.7, 61.0)],
            &SimParams::default(),
        );
        assert_eq!(names(&stops), ["kept"]);
    }

    #[test]
    fn past_the_end_is_dropped() {
        // Beyond the last point the lateral offset is the distance to the end.
        let stops = extract_stops(&east_route(), vec![cand("beyond", 1.3, 0.0)], &SimParams::default());
        assert!(stops.is_empty());
    }

    #[test]
    fn output_sorted_by_along_distance() {
        let stops = extract_stops(
            &east_route(),
            vec![cand("c", 0.9, 5.0), cand("a", 0.1, 5.0), cand("b", 0.5, 5.0)],
            &SimParams::default(),
        );
        assert_eq!(names(&stops), ["a", "b", "c"]);
        assert!(stops.windows(2).all(|w| w[0].along_km < w[1].along_km));
        assert!(close(stops[1].along_km, 0.5, 1e-6));
    }

    #[test]
    fn spacing_above_gap_keeps_both() {
        let stops = extract_stops(
            &east_route(),
            vec![cand("a", 0.2, 5.0), cand("b", 0.3, 30.0)],
            &SimParams::default(),
        );
        assert_eq!(names(&stops), ["a", "b"]);
    }

    #[test]
    fn dedup_compares_against_last_retained() {
        // b replaces a (50 m apart, closer to the route); c is 50 m after b
        // but further from the route, so it is dropped; d is clear of b.
        let stops = extract_stops(
            &east_route(),
            vec![
                cand("a", 0.20, 30.0),
                cand("b", 0.25, 10.0),
                cand("c", 0.30, 20.0),
                cand("d", 0.40, 25.0),
            ],
            &SimParams::default(),
        );
        assert_eq!(names(&stops), ["b", "d"]);
    }

    #[test]
    fn thresholds_are_configurable() {
        let params = SimParams { max_match_m: 100.0, min_gap_m: 10.0, ..SimParams::default() };
        let stops = extract_stops(
            &east_route(),
            vec![cand("a", 0.300, 90.0), cand("b", 0.330, 40.0)],
            &params,
        );
        assert_eq!(names(&stops), ["a", "b"]);
    }
}

// ── Sources ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod sources {
    use busim_core::GeoPoint;

    use super::helpers::{beside, east_route};
    use crate::{
        BoundingBox, FixedRouteSource, RouteError, RouteSource, StopCandidate, StopCatalog,
        StopSource, StraightLineSource,
    };

    #[test]
    fn fixed_route_joins_far_origin_and_destination() {
        let src = FixedRouteSource::new(east_route().points().to_vec());
        let origin = GeoPoint::new(0.001, 0.0); // ~111 m north of the first point
        let dest = GeoPoint::new(0.0, 0.011);
        let pts = src.route(origin, dest).unwrap();
        assert_eq!(pts.len(), 5);
        assert_eq!(pts[0], origin);
        assert_eq!(pts[4], dest);
    }

    #[test]
    fn fixed_route_near_ends_unchanged() {
        let src = FixedRouteSource::new(east_route().points().to_vec());
        let pts = src.route(GeoPoint::new(0.0, 0.00001), GeoPoint::new(0.0, 0.01)).unwrap();
        assert_eq!(pts.len(), 3);
    }

    #[test]
    fn empty_fixed_route_fails() {
        let src = FixedRouteSource::new(vec![]);
        let result = src.route(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 1.0));
        assert!(matches!(result, Err(RouteError::NoRoute { .. })));
    }

    #[test]
    fn straight_line() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.0, 0.01);
        assert_eq!(StraightLineSource.route(a, b).unwrap(), vec![a, b]);
        assert!(StraightLineSource.route(a, a).is_err());
    }

    #[test]
    fn bbox_around_route_with_margin() {
        let bbox = BoundingBox::around(&east_route(), 100.0);
        assert!(bbox.contains(beside(0.5, 50.0)));
        assert!(bbox.contains(beside(0.5, -90.0)));
        assert!(!bbox.contains(beside(0.5, 150.0)));
        assert!(bbox.min_lon < 0.0 && bbox.max_lon > 0.01);
    }

    #[test]
    fn catalog_bbox_query() {
        let catalog = StopCatalog::new(vec![
            StopCandidate::new("on route", beside(0.3, 5.0)),
            StopCandidate::new("also on route", beside(0.8, -5.0)),
            StopCandidate::new("across town", GeoPoint::new(0.05, 0.05)),
        ]);
        assert_eq!(catalog.len(), 3);
        assert!(!catalog.is_empty());

        let bbox = BoundingBox::around(&east_route(), 100.0);
        let mut found: Vec<String> = catalog
            .candidates(&bbox)
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        found.sort();
        assert_eq!(found, ["also on route", "on route"]);
    }

    #[test]
    fn empty_catalog() {
        let catalog = StopCatalog::new(vec![]);
        assert!(catalog.is_empty());
        let bbox = BoundingBox::around(&east_route(), 100.0);
        assert!(catalog.candidates(&bbox).unwrap().is_empty());
    }
}

// ── CSV loaders ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader {
    use std::io::Cursor;

    use busim_core::GeoPoint;

    use crate::{RouteError, load_candidates_reader, load_polyline_reader};

    #[test]
    fn polyline_rows_in_order() {
        let csv = "lat,lon\n-33.4579,-70.6495\n-33.4590,-70.6510\n";
        let pts = load_polyline_reader(Cursor::new(csv)).unwrap();
        assert_eq!(pts, vec![GeoPoint::new(-33.4579, -70.6495), GeoPoint::new(-33.4590, -70.6510)]);
    }

    #[test]
    fn polyline_invalid_coordinate() {
        let csv = "lat,lon\n95.0,0.0\n";
        let result = load_polyline_reader(Cursor::new(csv));
        assert!(matches!(result, Err(RouteError::Core(_))));
    }

    #[test]
    fn polyline_malformed_row() {
        let csv = "lat,lon\nabc,0.0\n";
        assert!(matches!(load_polyline_reader(Cursor::new(csv)), Err(RouteError::Parse(_))));
    }

    #[test]
    fn candidates_trim_names() {
        let csv = "name,lat,lon\n  Parada 3 ,-33.4601,-70.6522\n";
        let cands = load_candidates_reader(Cursor::new(csv)).unwrap();
        assert_eq!(cands.len(), 1);
        assert_eq!(cands[0].name, "Parada 3");
        assert_eq!(cands[0].point, GeoPoint::new(-33.4601, -70.6522));
    }
}
