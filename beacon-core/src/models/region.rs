use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

use crate::errors::{BeaconError, Result};

///
/// Region struct, an inclusive interval `[start, end]` on one reference sequence
///
#[derive(Eq, PartialEq, Hash, Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    pub reference_name: String,
    pub start: u64,
    pub end: u64,
}

impl Region {
    ///
    /// Create a new region, rejecting `start > end`
    ///
    pub fn new(reference_name: impl Into<String>, start: u64, end: u64) -> Result<Self> {
        let reference_name = reference_name.into();
        if start > end {
            return Err(BeaconError::InvalidConfiguration(format!(
                "region {}:{}-{} has start after end",
                reference_name, start, end
            )));
        }
        if reference_name.is_empty() {
            return Err(BeaconError::InvalidConfiguration(
                "region is missing a reference name".to_string(),
            ));
        }
        Ok(Region {
            reference_name,
            start,
            end,
        })
    }

    ///
    /// Number of bases covered, both ends included
    ///
    pub fn width(&self) -> u64 {
        (self.end - self.start).saturating_add(1)
    }

    ///
    /// Get the `chrom:start-end` form workers expect
    ///
    pub fn as_string(&self) -> String {
        format!("{}:{}-{}", self.reference_name, self.start, self.end)
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

impl FromStr for Region {
    type Err = BeaconError;

    fn from_str(s: &str) -> Result<Self> {
        // the reference name may itself contain ':' (e.g. HLA contigs)
        let (chrom, range) = s
            .rsplit_once(':')
            .ok_or_else(|| BeaconError::RegionParseError(s.to_string()))?;
        let (start, end) = range
            .split_once('-')
            .ok_or_else(|| BeaconError::RegionParseError(s.to_string()))?;

        let parse = |v: &str| {
            v.trim()
                .replace(',', "")
                .parse::<u64>()
                .map_err(|_| BeaconError::RegionParseError(s.to_string()))
        };

        Region::new(chrom, parse(start)?, parse(end)?)
    }
}

///
/// One bounded piece of a [`Region`], the unit of work handed to a worker
///
#[derive(Eq, PartialEq, Hash, Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Position in the split sequence, ascending by start offset
    pub index: usize,
    pub region: Region,
}

impl Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.index, self.region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("1:1-2500000", "1", 1, 2_500_000)]
    #[case("chrX:100-100", "chrX", 100, 100)]
    #[case("HLA-A*01:01:01:01:10-20", "HLA-A*01:01:01:01", 10, 20)]
    #[case("2:1,000-2,000", "2", 1000, 2000)]
    fn test_parse_region(
        #[case] input: &str,
        #[case] chrom: &str,
        #[case] start: u64,
        #[case] end: u64,
    ) {
        let region: Region = input.parse().unwrap();
        assert_eq!(region, Region::new(chrom, start, end).unwrap());
    }

    #[rstest]
    #[case("1")]
    #[case("1:100")]
    #[case("1:a-b")]
    #[case(":1-2")]
    fn test_parse_region_rejects_garbage(#[case] input: &str) {
        assert!(input.parse::<Region>().is_err());
    }

    #[test]
    fn test_start_after_end_is_invalid_configuration() {
        let err = Region::new("1", 10, 9).unwrap_err();
        assert!(matches!(err, BeaconError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_region_display_round_trips_worker_form() {
        let region = Region::new("1", 1_000_001, 2_000_000).unwrap();
        assert_eq!(region.to_string(), "1:1000001-2000000");
        assert_eq!(region.width(), 1_000_000);
        assert_eq!(region.to_string().parse::<Region>().unwrap(), region);
    }
}
