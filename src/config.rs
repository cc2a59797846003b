use std::env;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;

use tracing::{info, warn};

use crate::validator::PlacementConfig;

/// Complete application configuration, loaded from environment variables or default values.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub placement: PlacementSettings,
    pub floor_plan: FloorPlanSource,
}

impl AppConfig {
    /// Creates a configuration from the currently available environment variables.
    pub fn from_env() -> Self {
        Self {
            api: ApiConfig::from_env(),
            placement: PlacementSettings::from_env(),
            floor_plan: FloorPlanSource::from_env(),
        }
    }
}

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    bind_ip: IpAddr,
    display_host: String,
    port: u16,
}

impl ApiConfig {
    const DEFAULT_HOST: &'static str = "0.0.0.0";
    const DEFAULT_PORT: u16 = 8080;
    const HOST_VAR: &'static str = "FLOOR_PLAN_DESIGNER_API_HOST";
    const PORT_VAR: &'static str = "FLOOR_PLAN_DESIGNER_API_PORT";

    fn from_env() -> Self {
        let host_value =
            env_string(Self::HOST_VAR).unwrap_or_else(|| Self::DEFAULT_HOST.to_string());
        let (bind_ip, effective_host) = match host_value.parse::<IpAddr>() {
            Ok(ip) => (ip, host_value),
            Err(err) => {
                warn!(
                    "Could not parse {} ('{}'): {}. Using {}.",
                    Self::HOST_VAR,
                    host_value,
                    err,
                    Self::DEFAULT_HOST
                );
                (
                    IpAddr::V4(Ipv4Addr::UNSPECIFIED),
                    Self::DEFAULT_HOST.to_string(),
                )
            }
        };

        let port = match env_string(Self::PORT_VAR) {
            Some(raw) => parse_port(&raw).unwrap_or(Self::DEFAULT_PORT),
            None => Self::DEFAULT_PORT,
        };

        Self {
            bind_ip,
            display_host: effective_host,
            port,
        }
    }

    /// Socket address to bind the server to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_ip, self.port)
    }

    /// Visible hostname for logging and hints.
    pub fn display_host(&self) -> &str {
        &self.display_host
    }

    /// Configured port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Indicates whether binding to all interfaces.
    pub fn binds_to_all_interfaces(&self) -> bool {
        match self.bind_ip {
            IpAddr::V4(addr) => addr == Ipv4Addr::UNSPECIFIED,
            IpAddr::V6(addr) => addr == Ipv6Addr::UNSPECIFIED,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            display_host: Self::DEFAULT_HOST.to_string(),
            port: Self::DEFAULT_PORT,
        }
    }
}

/// Placement rules plus the interaction options that sit on top of them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementSettings {
    pub rules: PlacementConfig,
    /// Round move targets to the half-unit grid before validating.
    pub snap_to_grid: bool,
}

impl PlacementSettings {
    const PLAYFIELD_WIDTH_VAR: &'static str = "FLOOR_PLAN_DESIGNER_PLAYFIELD_WIDTH";
    const PLAYFIELD_HEIGHT_VAR: &'static str = "FLOOR_PLAN_DESIGNER_PLAYFIELD_HEIGHT";
    const DOOR_RADIUS_VAR: &'static str = "FLOOR_PLAN_DESIGNER_DOOR_RADIUS";
    const ROTATION_RATE_VAR: &'static str = "FLOOR_PLAN_DESIGNER_ROTATION_RATE";
    const SNAP_VAR: &'static str = "FLOOR_PLAN_DESIGNER_SNAP_TO_GRID";
    const DEFAULT_SNAP_TO_GRID: bool = true;

    fn from_env() -> Self {
        let playfield_width = load_f64_with_warning(
            Self::PLAYFIELD_WIDTH_VAR,
            PlacementConfig::DEFAULT_PLAYFIELD_WIDTH,
            |value| value > 0.0,
            "must be greater than 0",
            "Playfield width differs from the drawn map",
        );

        let playfield_height = load_f64_with_warning(
            Self::PLAYFIELD_HEIGHT_VAR,
            PlacementConfig::DEFAULT_PLAYFIELD_HEIGHT,
            |value| value > 0.0,
            "must be greater than 0",
            "Playfield height differs from the drawn map",
        );

        let door_radius = load_f64_with_warning(
            Self::DOOR_RADIUS_VAR,
            PlacementConfig::DEFAULT_DOOR_RADIUS,
            |value| value >= 0.0,
            "must not be negative",
            "Adjusted door clearance changes which placements are accepted",
        );

        let rotation_rate = load_f64_with_warning(
            Self::ROTATION_RATE_VAR,
            PlacementConfig::DEFAULT_ROTATION_RATE,
            |value| value > 0.0,
            "must be greater than 0",
            "Adjusted drag rotation rate",
        );

        let snap_to_grid = env_string(Self::SNAP_VAR)
            .and_then(|raw| parse_bool(&raw, Self::SNAP_VAR))
            .unwrap_or(Self::DEFAULT_SNAP_TO_GRID);

        let rules = PlacementConfig::builder()
            .playfield_width(playfield_width)
            .playfield_height(playfield_height)
            .door_radius(door_radius)
            .rotation_rate(rotation_rate)
            .build();

        Self {
            rules,
            snap_to_grid,
        }
    }
}

impl Default for PlacementSettings {
    fn default() -> Self {
        Self {
            rules: PlacementConfig::default(),
            snap_to_grid: Self::DEFAULT_SNAP_TO_GRID,
        }
    }
}

/// Where the floor plan loaded at startup comes from.
#[derive(Clone, Debug, PartialEq)]
pub struct FloorPlanSource {
    path: PathBuf,
}

impl FloorPlanSource {
    const DEFAULT_PATH: &'static str = "assets/floor-plan.json";
    const PATH_VAR: &'static str = "FLOOR_PLAN_DESIGNER_FLOOR_PLAN_PATH";

    fn from_env() -> Self {
        Self {
            path: env_string(Self::PATH_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_PATH)),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl Default for FloorPlanSource {
    fn default() -> Self {
        Self {
            path: PathBuf::from(Self::DEFAULT_PATH),
        }
    }
}

fn env_string(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_owned())
            }
        }
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            warn!("Access to {} failed: {}. Using default value.", name, err);
            None
        }
    }
}

fn parse_port(raw: &str) -> Option<u16> {
    match raw.trim().parse::<u16>() {
        Ok(0) => {
            warn!("{} must not be 0. Using default.", ApiConfig::PORT_VAR);
            None
        }
        Ok(value) => Some(value),
        Err(err) => {
            warn!(
                "Could not parse {} ('{}'): {}. Using default.",
                ApiConfig::PORT_VAR,
                raw,
                err
            );
            None
        }
    }
}

fn parse_bool(raw: &str, var_name: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        other => {
            warn!(
                "Could not interpret {} ('{}') as boolean value. Using default value.",
                var_name, other
            );
            None
        }
    }
}

fn parse_f64_checked(
    raw: &str,
    var_name: &str,
    default: f64,
    validator: impl Fn(f64) -> bool,
    invalid_hint: &str,
) -> f64 {
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && validator(value) => value,
        Ok(_) => {
            warn!(
                "{} contains invalid value '{}': {}. Using {}.",
                var_name, raw, invalid_hint, default
            );
            default
        }
        Err(err) => {
            warn!(
                "Could not parse {} ('{}') as number: {}. Using {}.",
                var_name, raw, err, default
            );
            default
        }
    }
}

fn load_f64_with_warning(
    var_name: &str,
    default: f64,
    validator: impl Fn(f64) -> bool,
    invalid_hint: &str,
    notice: &str,
) -> f64 {
    let Some(raw) = env_string(var_name) else {
        return default;
    };
    let value = parse_f64_checked(&raw, var_name, default, validator, invalid_hint);
    let tolerance = (default.abs().max(1.0)) * 1e-9;
    if (value - default).abs() > tolerance {
        info!("{} ({} = {}).", notice, var_name, value);
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_true_values() {
        assert_eq!(parse_bool("1", "TEST_VAR"), Some(true));
        assert_eq!(parse_bool("true", "TEST_VAR"), Some(true));
        assert_eq!(parse_bool("yes", "TEST_VAR"), Some(true));
        assert_eq!(parse_bool("y", "TEST_VAR"), Some(true));
        assert_eq!(parse_bool("on", "TEST_VAR"), Some(true));

        // Test case insensitivity
        assert_eq!(parse_bool("TRUE", "TEST_VAR"), Some(true));
        assert_eq!(parse_bool("ON", "TEST_VAR"), Some(true));

        // Test with whitespace
        assert_eq!(parse_bool(" true ", "TEST_VAR"), Some(true));
    }

    #[test]
    fn test_parse_bool_false_values() {
        assert_eq!(parse_bool("0", "TEST_VAR"), Some(false));
        assert_eq!(parse_bool("false", "TEST_VAR"), Some(false));
        assert_eq!(parse_bool("no", "TEST_VAR"), Some(false));
        assert_eq!(parse_bool("n", "TEST_VAR"), Some(false));
        assert_eq!(parse_bool("OFF", "TEST_VAR"), Some(false));
        assert_eq!(parse_bool("  0  ", "TEST_VAR"), Some(false));
    }

    #[test]
    fn test_parse_bool_invalid_values() {
        assert_eq!(parse_bool("invalid", "TEST_VAR"), None);
        assert_eq!(parse_bool("2", "TEST_VAR"), None);
        assert_eq!(parse_bool("", "TEST_VAR"), None);
    }

    #[test]
    fn test_parse_port() {
        assert_eq!(parse_port("3000"), Some(3000));
        assert_eq!(parse_port(" 8081 "), Some(8081));
        assert_eq!(parse_port("0"), None);
        assert_eq!(parse_port("70000"), None);
        assert_eq!(parse_port("http"), None);
    }

    #[test]
    fn test_parse_f64_checked_falls_back_to_default() {
        let positive = |value: f64| value > 0.0;
        assert_eq!(parse_f64_checked("2.5", "V", 1.0, positive, "> 0"), 2.5);
        assert_eq!(parse_f64_checked("-3", "V", 1.0, positive, "> 0"), 1.0);
        assert_eq!(parse_f64_checked("NaN", "V", 1.0, |_| true, "finite"), 1.0);
        assert_eq!(parse_f64_checked("wide", "V", 1.0, positive, "> 0"), 1.0);
    }

    #[test]
    fn test_defaults_match_placement_rules() {
        let settings = PlacementSettings::default();
        assert_eq!(settings.rules, PlacementConfig::default());
        assert!(settings.snap_to_grid);
        assert_eq!(
            FloorPlanSource::default().path(),
            std::path::Path::new("assets/floor-plan.json")
        );
        assert!(ApiConfig::default().binds_to_all_interfaces());
        assert_eq!(ApiConfig::default().port(), 8080);
    }
}
