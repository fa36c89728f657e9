use geo::{Distance, Haversine, Point};

use crate::models::{GeoPoint, NearbyQuery, SightingRecord};

/// Great-circle distance between two points in meters
pub fn haversine_distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let p1: Point = (*a).into();
    let p2: Point = (*b).into();
    Haversine.distance(p1, p2)
}

/// Apply a nearby query to a set of records
///
/// Keeps records inside the radius that match the category filter, orders
/// them nearest first and truncates to the query limit. Equal distances are
/// ordered by creation time, then id, so results are stable.
pub fn rank_nearby<'a, I>(records: I, query: &NearbyQuery) -> Vec<SightingRecord>
where
    I: IntoIterator<Item = &'a SightingRecord>,
{
    let mut hits: Vec<(f64, &SightingRecord)> = records
        .into_iter()
        .filter(|record| query.matches_category(record.category.as_deref()))
        .filter_map(|record| {
            let distance = haversine_distance(&query.center, &record.location);
            (distance <= query.max_distance_m).then_some((distance, record))
        })
        .collect();

    hits.sort_by(|(da, a), (db, b)| {
        da.total_cmp(db)
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.id.cmp(&b.id))
    });

    hits.into_iter().take(query.limit).map(|(_, record)| record.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewSighting, SightingId};
    use crate::spatial::offset_north;
    use proptest::prelude::*;

    fn record_at(point: GeoPoint, category: Option<&str>) -> SightingRecord {
        let mut sighting = NewSighting::new(point);
        if let Some(c) = category {
            sighting = sighting.with_category(c);
        }
        sighting.into_record(SightingId::generate())
    }

    #[test]
    fn test_haversine_same_point() {
        let p = GeoPoint::from_lat_lng(-8.5069, 115.2625).unwrap();
        assert!(haversine_distance(&p, &p) < 1e-6);
    }

    #[test]
    fn test_haversine_known_distance() {
        // One degree of latitude is about 111.2 km on the mean-radius sphere
        let a = GeoPoint::from_lat_lng(0.0, 0.0).unwrap();
        let b = GeoPoint::from_lat_lng(1.0, 0.0).unwrap();
        let d = haversine_distance(&a, &b);
        assert!((d - 111_195.0).abs() < 100.0, "got {}", d);
    }

    #[test]
    fn test_rank_nearby_scenario() {
        let center = GeoPoint::from_lat_lng(12.97, 77.59).unwrap();
        let a = record_at(center, None);
        let b = record_at(offset_north(&center, 500.0).unwrap(), None);
        let c = record_at(offset_north(&center, 200_000.0).unwrap(), None);
        let records = vec![c.clone(), b.clone(), a.clone()];

        let query = NearbyQuery::new(center).max_distance(100_000.0).unwrap();
        let ids: Vec<_> = rank_nearby(&records, &query).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);

        let query = NearbyQuery::new(center).max_distance(1_000_000.0).unwrap();
        let ids: Vec<_> = rank_nearby(&records, &query).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![a.id, b.id, c.id]);
    }

    #[test]
    fn test_rank_nearby_category_and_limit() {
        let center = GeoPoint::from_lat_lng(40.0, -74.0).unwrap();
        let brown = record_at(offset_north(&center, 10.0).unwrap(), Some("Brown"));
        let black_near = record_at(offset_north(&center, 20.0).unwrap(), Some("Black"));
        let black_far = record_at(offset_north(&center, 30.0).unwrap(), Some("Black"));
        let records = vec![brown, black_near.clone(), black_far];

        let query = NearbyQuery::new(center).category(Some("Black".to_string())).limit(1);
        let hits = rank_nearby(&records, &query);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, black_near.id);
    }

    proptest! {
        #[test]
        fn prop_larger_radius_returns_superset(
            offsets in proptest::collection::vec(0.0f64..300_000.0, 1..20),
            small in 0.0f64..150_000.0,
            extra in 0.0f64..150_000.0,
        ) {
            let center = GeoPoint::from_lat_lng(10.0, 20.0).unwrap();
            let records: Vec<_> = offsets
                .iter()
                .map(|m| record_at(offset_north(&center, *m).unwrap(), None))
                .collect();

            let narrow = NearbyQuery::new(center).max_distance(small).unwrap().limit(usize::MAX);
            let wide = NearbyQuery::new(center).max_distance(small + extra).unwrap().limit(usize::MAX);

            let narrow_ids: Vec<_> = rank_nearby(&records, &narrow).iter().map(|r| r.id).collect();
            let wide_ids: Vec<_> = rank_nearby(&records, &wide).iter().map(|r| r.id).collect();

            for id in &narrow_ids {
                prop_assert!(wide_ids.contains(id));
            }
        }
    }
}
