//! NSIDC-0272 release naming.
//!
//! Each GLIMS database release is published as two archives, one per
//! hemisphere, each with an `.md5` companion:
//!
//! ```text
//! NSIDC-0272_glims_db_north_20260114_v01.0.zip
//! NSIDC-0272_glims_db_north_20260114_v01.0.zip.md5
//! NSIDC-0272_glims_db_south_20260114_v01.0.zip
//! NSIDC-0272_glims_db_south_20260114_v01.0.zip.md5
//! ```

use crate::{FetchError, Result};
use chrono::NaiveDate;
use std::str::FromStr;

/// Directory listing the NSIDC-0272 archives.
pub const BASE_URL: &str = "https://daacdata.apps.nsidc.org/pub/DATASETS/nsidc0272_GLIMS_v1/";

/// Dataset version tag embedded in archive names.
pub const VERSION_TAG: &str = "v01.0";

/// Hemisphere of a GLIMS archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hemisphere {
    /// Northern hemisphere.
    North,
    /// Southern hemisphere.
    South,
}

impl Hemisphere {
    /// Both hemispheres, north first.
    pub const ALL: [Hemisphere; 2] = [Hemisphere::North, Hemisphere::South];

    /// Name used in archive file names.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Hemisphere::North => "north",
            Hemisphere::South => "south",
        }
    }
}

/// A release date stamp (`YYYYMMDD`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReleaseDate(NaiveDate);

impl ReleaseDate {
    /// Parse an 8-digit `YYYYMMDD` stamp that names a real calendar date.
    pub fn parse(text: &str) -> Result<Self> {
        if text.len() != 8 || !text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FetchError::InvalidDate(text.to_string()));
        }
        NaiveDate::parse_from_str(text, "%Y%m%d")
            .map(ReleaseDate)
            .map_err(|_| FetchError::InvalidDate(text.to_string()))
    }

    /// The calendar date.
    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Archive file name for one hemisphere.
    pub fn archive_name(&self, hemisphere: Hemisphere) -> String {
        format!(
            "NSIDC-0272_glims_db_{}_{}_{}.zip",
            hemisphere.as_str(),
            self,
            VERSION_TAG
        )
    }
}

impl FromStr for ReleaseDate {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl std::fmt::Display for ReleaseDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y%m%d"))
    }
}

/// The four file names of a release: north, north.md5, south, south.md5.
pub fn targets_for_date(date: &ReleaseDate) -> Vec<String> {
    Hemisphere::ALL
        .iter()
        .flat_map(|h| {
            let zip = date.archive_name(*h);
            let md5 = format!("{}.md5", zip);
            [zip, md5]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_date() {
        let date = ReleaseDate::parse("20260114").unwrap();
        assert_eq!(date.date(), NaiveDate::from_ymd_opt(2026, 1, 14).unwrap());
        assert_eq!(date.to_string(), "20260114");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["2026011", "202601140", "2026-01-14", "abcdefgh", "", "２０２６０１１４"] {
            assert!(
                matches!(ReleaseDate::parse(bad), Err(FetchError::InvalidDate(_))),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_parse_rejects_impossible_date() {
        assert!(ReleaseDate::parse("20260230").is_err());
        assert!(ReleaseDate::parse("20261301").is_err());
        assert!(ReleaseDate::parse("20240229").is_ok());
    }

    #[test]
    fn test_targets_for_date() {
        let date: ReleaseDate = "20260114".parse().unwrap();
        assert_eq!(
            targets_for_date(&date),
            vec![
                "NSIDC-0272_glims_db_north_20260114_v01.0.zip",
                "NSIDC-0272_glims_db_north_20260114_v01.0.zip.md5",
                "NSIDC-0272_glims_db_south_20260114_v01.0.zip",
                "NSIDC-0272_glims_db_south_20260114_v01.0.zip.md5",
            ]
        );
    }
}
