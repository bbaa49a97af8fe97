// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Detection of the version of the installed Gromacs.

use regex::Regex;

use crate::auxiliary::MIN_GMX_VERSION;
use crate::config::GmxProperties;
use crate::errors::GmxVersionError;
use crate::runner::command::GmxCommand;

/// Parse the version of Gromacs from the output of `gmx -version`.
///
/// The version is normalized into an integer: dots are removed and
/// the number is padded with zeros to five digits for `20XX` versions
/// and to three digits for older versions (`2021.4` -> `20214`, `5.1.2` -> `512`, `2018` -> `20180`).
/// Suffixes of development and distribution builds (`2022.5-Debian_2022.5_2`, `2023-dev`) are ignored.
///
/// Returns 0 if the version could not be parsed.
pub fn parse_gmx_version(output: &str) -> u32 {
    let regex = Regex::new(r"GROMACS version:\s+(?:VERSION\s+)?(\d+(?:\.\d+)*)").expect(
        "FATAL GMXBB ERROR | version::parse_gmx_version | Could not construct regular expression.",
    );

    let raw = match output
        .lines()
        .find_map(|line| regex.captures(line.trim()).map(|c| c[1].to_owned()))
    {
        Some(x) => x,
        None => return 0,
    };

    let mut version = raw.replace('.', "");

    let digits = if version.starts_with('2') { 5 } else { 3 };
    while version.len() < digits {
        version.push('0');
    }

    version.parse::<u32>().unwrap_or(0)
}

/// Run `gmx -version` and get the normalized version of Gromacs.
/// Returns 0 if the version could not be obtained.
pub fn get_gmx_version(gmx: &GmxProperties) -> u32 {
    let mut command = match GmxCommand::from_line(&gmx.gmx_path) {
        Ok(x) => x,
        Err(_) => return 0,
    };
    command.arg("-version");

    if let Some(lib) = &gmx.gmx_lib {
        command.env("GMXLIB", lib);
    }

    match command.execute() {
        Ok(output) => parse_gmx_version(&output.stdout),
        Err(e) => {
            log::warn!("Could not obtain Gromacs version: {}", e);
            0
        }
    }
}

/// Check that the installed Gromacs is not older than the oldest supported version.
///
/// ## Returns
/// Detected version or `GmxVersionError::TooOld`.
pub fn check_gmx_version(gmx: &GmxProperties) -> Result<u32, GmxVersionError> {
    let detected = get_gmx_version(gmx);

    if detected < MIN_GMX_VERSION {
        Err(GmxVersionError::TooOld {
            detected,
            required: MIN_GMX_VERSION,
        })
    } else {
        log::info!("GROMACS version {} detected.", detected);
        Ok(detected)
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! parse_version {
        ($name:ident, $banner:expr, $expected:expr) => {
            paste::paste! {
                #[test]
                fn [<parse_ $name>]() {
                    let output = format!(
                        "                :-) GROMACS - gmx, {} (-:\n\nGROMACS version:    {}\nPrecision:          mixed\n",
                        $banner, $banner
                    );
                    assert_eq!(parse_gmx_version(&output), $expected);
                }
            }
        };
    }

    parse_version!(v2021_4, "2021.4", 20214);
    parse_version!(v2018, "2018", 20180);
    parse_version!(v2023_1, "2023.1", 20231);
    parse_version!(v5_1_2, "5.1.2", 512);
    parse_version!(v5_1, "5.1", 510);
    parse_version!(vversion_5_1_4, "VERSION 5.1.4", 514);
    parse_version!(v4_6_7, "4.6.7", 467);
    parse_version!(debian_2022_5, "2022.5-Debian_2022.5_2", 20225);
    parse_version!(dev_2023, "2023-dev-20230101-abc", 20230);
    parse_version!(modified_2021_4, "2021.4-MODIFIED", 20214);
    parse_version!(conda_2024_2, "2024.2-conda_forge", 20242);

    #[test]
    fn parse_missing() {
        assert_eq!(parse_gmx_version("gmx: command not found"), 0);
        assert_eq!(parse_gmx_version(""), 0);
    }

    #[test]
    fn parse_unparsable() {
        assert_eq!(parse_gmx_version("GROMACS version:    unknown"), 0);
    }

    #[cfg(unix)]
    #[test]
    fn check_version() {
        let dir = tempfile::TempDir::new().unwrap();
        let gmx = GmxProperties {
            gmx_path: crate::test_utilities::utilities::fake_gmx(dir.path(), "2021.4", 0),
            ..Default::default()
        };

        assert_eq!(check_gmx_version(&gmx), Ok(20214));
    }

    #[cfg(unix)]
    #[test]
    fn check_version_too_old() {
        let dir = tempfile::TempDir::new().unwrap();
        let gmx = GmxProperties {
            gmx_path: crate::test_utilities::utilities::fake_gmx(dir.path(), "4.6.7", 0),
            ..Default::default()
        };

        assert_eq!(
            check_gmx_version(&gmx),
            Err(GmxVersionError::TooOld {
                detected: 467,
                required: 512
            })
        );
    }

    #[test]
    fn check_version_missing_binary() {
        let gmx = GmxProperties {
            gmx_path: "nonexistent_gromacs_binary_Xhfguiedhq".to_owned(),
            ..Default::default()
        };

        assert_eq!(
            check_gmx_version(&gmx),
            Err(GmxVersionError::TooOld {
                detected: 0,
                required: 512
            })
        );
    }
}
