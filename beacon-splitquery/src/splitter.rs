use beacon_core::errors::BeaconError;
use beacon_core::models::{Chunk, Region};

/// Number of chunks [`split_region`] produces, without building them.
pub fn chunk_count(region: &Region, max_span: u64) -> u64 {
    region.width().div_ceil(max_span.max(1))
}

///
/// Split a region into contiguous chunks spanning at most `max_span` bases.
///
/// The chunks are ordered by start, do not overlap and cover the region
/// exactly; only the last one may be shorter than `max_span`.
///
/// # Arguments
/// - region: inclusive interval to split
/// - max_span: largest chunk width, must be positive
///
pub fn split_region(region: &Region, max_span: u64) -> Result<Vec<Chunk>, BeaconError> {
    if max_span == 0 {
        return Err(BeaconError::InvalidConfiguration(
            "chunk span must be positive".to_string(),
        ));
    }
    if region.start > region.end {
        return Err(BeaconError::InvalidConfiguration(format!(
            "region {} has start after end",
            region
        )));
    }

    let mut chunks = Vec::with_capacity((region.width() / max_span + 1).min(1024) as usize);
    let mut split_start = region.start;
    loop {
        let split_end = split_start.saturating_add(max_span - 1).min(region.end);
        chunks.push(Chunk {
            index: chunks.len(),
            region: Region {
                reference_name: region.reference_name.clone(),
                start: split_start,
                end: split_end,
            },
        });
        if split_end == region.end {
            break;
        }
        split_start = split_end + 1;
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rstest::rstest;

    fn spans(chunks: &[Chunk]) -> Vec<(u64, u64)> {
        chunks.iter().map(|c| (c.region.start, c.region.end)).collect()
    }

    #[test]
    fn test_split_two_and_a_half_megabases() {
        let region = Region::new("1", 1, 2_500_000).unwrap();
        let chunks = split_region(&region, 1_000_000).unwrap();
        assert_eq!(
            spans(&chunks),
            vec![
                (1, 1_000_000),
                (1_000_001, 2_000_000),
                (2_000_001, 2_500_000)
            ]
        );
        assert!(chunks.iter().all(|c| c.region.reference_name == "1"));
        assert_eq!(
            chunks.iter().map(|c| c.index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[rstest]
    #[case(5, 5, 10, vec![(5, 5)])]
    #[case(1, 10, 10, vec![(1, 10)])]
    #[case(1, 11, 10, vec![(1, 10), (11, 11)])]
    #[case(0, 5, 2, vec![(0, 1), (2, 3), (4, 5)])]
    #[case(3, 6, 1, vec![(3, 3), (4, 4), (5, 5), (6, 6)])]
    fn test_split_boundaries(
        #[case] start: u64,
        #[case] end: u64,
        #[case] max_span: u64,
        #[case] expected: Vec<(u64, u64)>,
    ) {
        let region = Region::new("chr2", start, end).unwrap();
        assert_eq!(spans(&split_region(&region, max_span).unwrap()), expected);
    }

    #[test]
    fn test_split_at_end_of_coordinate_space() {
        let region = Region::new("1", u64::MAX - 4, u64::MAX).unwrap();
        let chunks = split_region(&region, 3).unwrap();
        assert_eq!(
            spans(&chunks),
            vec![(u64::MAX - 4, u64::MAX - 2), (u64::MAX - 1, u64::MAX)]
        );
    }

    #[rstest]
    #[case(1, 2_500_000, 1_000_000, 3)]
    #[case(1, 1_000_000, 1_000_000, 1)]
    #[case(5, 5, 10, 1)]
    #[case(0, 1_000_000_000_000_000, 1_000_000, 1_000_000_000)]
    #[case(0, u64::MAX, 1, u64::MAX)]
    fn test_chunk_count(
        #[case] start: u64,
        #[case] end: u64,
        #[case] max_span: u64,
        #[case] expected: u64,
    ) {
        let region = Region::new("1", start, end).unwrap();
        assert_eq!(chunk_count(&region, max_span), expected);
    }

    #[test]
    fn test_zero_span_is_invalid_configuration() {
        let region = Region::new("1", 1, 100).unwrap();
        assert!(matches!(
            split_region(&region, 0),
            Err(BeaconError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_inverted_region_is_invalid_configuration() {
        // bypasses Region::new on purpose
        let region = Region {
            reference_name: "1".to_string(),
            start: 10,
            end: 1,
        };
        assert!(split_region(&region, 5).is_err());
    }

    #[test]
    fn test_chunks_tile_random_regions() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let start = rng.random_range(0..10_000u64);
            let end = start + rng.random_range(0..5_000u64);
            let max_span = rng.random_range(1..700u64);
            let region = Region::new("1", start, end).unwrap();
            let chunks = split_region(&region, max_span).unwrap();

            assert_eq!(chunks.first().unwrap().region.start, start);
            assert_eq!(chunks.last().unwrap().region.end, end);
            for c in &chunks {
                assert!(c.region.start <= c.region.end);
                assert!(c.region.width() <= max_span);
            }
            for pair in chunks.windows(2) {
                assert_eq!(pair[0].region.end + 1, pair[1].region.start);
            }
            let covered: u64 = chunks.iter().map(|c| c.region.width()).sum();
            assert_eq!(covered, region.width());
            assert_eq!(chunks.len() as u64, chunk_count(&region, max_span));
        }
    }
}
