// Data-driven pathing configuration.
//
// Every tunable the engine reads lives in `PathingConfig`: movement toggles,
// cost coefficients, search timeouts, executor tolerances, failure-memory
// parameters, and the worker pool size. It is loaded from JSON (missing
// fields fall back to `Default`), optionally patched with named key/value
// overrides, and validated before use.
//
// The orchestrator holds the active config behind an `Arc`. Each search
// captures that `Arc` when it starts, so a config change takes effect for the
// next search and is never observed halfway through one.
//
// See also: `context.rs` which snapshots this into a `CalculationContext`,
// `failure_memory.rs` for `FailureParams`, `orchestrator.rs` for
// `set_config`.
//
// **Critical constraint: immutable while shared.** Once wrapped in an `Arc`
// and handed to a search, a config is never mutated.

use crate::error::ConfigError;
use crate::goal::{COST_HEURISTIC, MAX_ADMISSIBLE_FALL};
use crate::types::BlockState;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// All engine tunables. Loaded from JSON, never mutated while a search holds
/// it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathingConfig {
    // -- Movement toggles --
    /// Allow breaking blocks that are in the way.
    pub allow_break: bool,
    /// Allow placing blocks (bridging, pillaring).
    pub allow_place: bool,
    pub allow_sprint: bool,
    /// Allow jumping over gaps.
    pub allow_parkour: bool,
    /// Allow a parkour jump that lands on a freshly placed block.
    pub allow_parkour_place: bool,
    /// Allow diagonal moves that step up a block.
    pub allow_diagonal_ascend: bool,
    pub allow_swimming: bool,
    /// Enable the long-range teleport provider.
    pub allow_teleport: bool,
    /// Count a movement as finished when the agent ends up one step past its
    /// destination.
    pub allow_overshoot: bool,
    /// Longest fall (in blocks) the provider will generate onto solid ground.
    pub max_fall_height_no_water: u32,

    // -- Costs --
    /// Flat cost added for each placed block.
    pub block_place_cost: f64,
    /// Flat cost added for each broken block on top of its break time.
    pub block_break_additional_penalty: f64,
    /// Multiplier on the break time of each block.
    pub break_cost_multiplier: f64,
    /// Surcharge for moving through a position adjacent to lava.
    pub lava_proximity_penalty: f64,
    /// Surcharge for breaking a block that has a gravity block on top of it.
    pub falling_block_penalty: f64,
    /// Blocks the provider must never break.
    pub avoid_breaking: Vec<BlockState>,
    /// Hostiles within this many blocks of a node make it more expensive.
    pub mob_avoidance_radius: i32,
    /// Cost multiplier for nodes inside a hostile's avoidance radius.
    pub mob_avoidance_coefficient: f64,
    /// Cost multiplier for nodes on the previous segment. Below 1.0 favors
    /// reusing it; 1.0 disables the effect.
    pub backtrack_cost_favoring_coefficient: f64,

    // -- Search --
    /// Weight on `h` in the open-set priority `g + weight * h`.
    pub heuristic_weight: f64,
    /// Ignore cost improvements smaller than `MIN_IMPROVEMENT`.
    pub minimum_improvement_repropagation: bool,
    pub primary_timeout_ms: u64,
    pub failure_timeout_ms: u64,
    pub plan_ahead_primary_timeout_ms: u64,
    pub plan_ahead_failure_timeout_ms: u64,
    /// Stop the search after this many expansions bumped into unloaded
    /// chunks.
    pub pathing_max_chunk_border_fetch: u32,
    /// Hard ceiling on node count per search.
    pub max_nodes: usize,

    // -- Execution and planning --
    /// Start planning the next segment when fewer than this many ticks
    /// remain in the current one.
    pub planning_tick_lookahead: u32,
    /// Extra ticks a movement may take beyond its estimate before timing out.
    pub movement_timeout_ticks: u32,
    /// How many upcoming movements to re-cost when the executor advances.
    pub cost_verification_lookahead: usize,
    /// Largest tolerated increase of a movement's cost over its planned cost.
    pub max_cost_increase: f64,
    /// Splice the next segment onto the current path as soon as the agent
    /// stands on it.
    pub splice_path: bool,
    /// Trim the tail of long segments that do not reach the goal.
    pub cut_off_path: bool,
    pub path_cutoff_minimum_length: usize,
    pub path_cutoff_factor: f64,
    /// Positions behind the agent kept after splicing before history is cut.
    pub max_path_history_length: usize,
    pub path_history_cutoff_amount: usize,

    // -- Failure memory --
    pub failure_memory_enabled: bool,
    pub failure_multiplier: f64,
    pub failure_max_penalty: f64,
    pub failure_max_attempts: u32,
    pub failure_memory_duration_ms: u64,
    pub failure_cleanup_interval_ticks: u64,

    // -- Teleport --
    pub teleport_cost: f64,
    pub teleport_min_distance: i32,
    pub teleport_max_distance: i32,
    pub teleport_step: i32,

    /// Threads in the background search pool.
    pub worker_threads: usize,
}

impl Default for PathingConfig {
    fn default() -> Self {
        Self {
            allow_break: true,
            allow_place: true,
            allow_sprint: true,
            allow_parkour: true,
            allow_parkour_place: false,
            allow_diagonal_ascend: false,
            allow_swimming: true,
            allow_teleport: false,
            allow_overshoot: true,
            max_fall_height_no_water: 3,

            block_place_cost: 20.0,
            block_break_additional_penalty: 2.0,
            break_cost_multiplier: 1.0,
            lava_proximity_penalty: 20.0,
            falling_block_penalty: 15.0,
            avoid_breaking: vec![BlockState::Bedrock],
            mob_avoidance_radius: 8,
            mob_avoidance_coefficient: 1.5,
            backtrack_cost_favoring_coefficient: 0.5,

            heuristic_weight: 1.0,
            minimum_improvement_repropagation: true,
            primary_timeout_ms: 500,
            failure_timeout_ms: 2000,
            plan_ahead_primary_timeout_ms: 4000,
            plan_ahead_failure_timeout_ms: 5000,
            pathing_max_chunk_border_fetch: 50,
            max_nodes: 2_000_000,

            planning_tick_lookahead: 150,
            movement_timeout_ticks: 100,
            cost_verification_lookahead: 5,
            max_cost_increase: 10.0,
            splice_path: true,
            cut_off_path: true,
            path_cutoff_minimum_length: 30,
            path_cutoff_factor: 0.9,
            max_path_history_length: 300,
            path_history_cutoff_amount: 50,

            failure_memory_enabled: true,
            failure_multiplier: 5.0,
            failure_max_penalty: 50.0,
            failure_max_attempts: 6,
            failure_memory_duration_ms: 60_000,
            failure_cleanup_interval_ticks: 200,

            teleport_cost: 60.0,
            teleport_min_distance: 4,
            teleport_max_distance: 16,
            teleport_step: 4,

            worker_threads: 1,
        }
    }
}

impl PathingConfig {
    /// Parse a config from JSON. Fields missing from the document keep their
    /// defaults. The result is validated.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Return a copy with named fields replaced. Keys are the JSON field
    /// names. Each override is applied and type-checked individually so the
    /// error names the offending key.
    pub fn with_overrides(
        &self,
        overrides: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Self, ConfigError> {
        use serde_json::Value;

        let Value::Object(mut fields) = serde_json::to_value(self)? else {
            return Err(ConfigError::InvalidValue {
                key: String::new(),
                reason: "config did not serialize to a JSON object".to_string(),
            });
        };
        for (key, value) in overrides {
            if !fields.contains_key(key) {
                return Err(ConfigError::UnknownKey(key.clone()));
            }
            fields.insert(key.clone(), value.clone());
            if let Err(e) = serde_json::from_value::<Self>(Value::Object(fields.clone())) {
                return Err(ConfigError::InvalidValue {
                    key: key.clone(),
                    reason: e.to_string(),
                });
            }
        }
        let config: Self = serde_json::from_value(Value::Object(fields))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, reason: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            reason: reason.to_string(),
        };

        let timeouts = [
            ("primary_timeout_ms", self.primary_timeout_ms),
            ("failure_timeout_ms", self.failure_timeout_ms),
            ("plan_ahead_primary_timeout_ms", self.plan_ahead_primary_timeout_ms),
            ("plan_ahead_failure_timeout_ms", self.plan_ahead_failure_timeout_ms),
        ];
        for (key, value) in timeouts {
            if value == 0 {
                return Err(invalid(key, "must be positive"));
            }
        }
        if self.failure_timeout_ms < self.primary_timeout_ms {
            return Err(invalid(
                "failure_timeout_ms",
                "must not be shorter than primary_timeout_ms",
            ));
        }
        if self.plan_ahead_failure_timeout_ms < self.plan_ahead_primary_timeout_ms {
            return Err(invalid(
                "plan_ahead_failure_timeout_ms",
                "must not be shorter than plan_ahead_primary_timeout_ms",
            ));
        }

        let non_negative = [
            ("block_place_cost", self.block_place_cost),
            ("block_break_additional_penalty", self.block_break_additional_penalty),
            ("break_cost_multiplier", self.break_cost_multiplier),
            ("lava_proximity_penalty", self.lava_proximity_penalty),
            ("falling_block_penalty", self.falling_block_penalty),
            ("max_cost_increase", self.max_cost_increase),
        ];
        for (key, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(key, "must be finite and non-negative"));
            }
        }

        let positive = [
            ("mob_avoidance_coefficient", self.mob_avoidance_coefficient),
            (
                "backtrack_cost_favoring_coefficient",
                self.backtrack_cost_favoring_coefficient,
            ),
            ("heuristic_weight", self.heuristic_weight),
            ("failure_multiplier", self.failure_multiplier),
            ("failure_max_penalty", self.failure_max_penalty),
            ("teleport_cost", self.teleport_cost),
        ];
        for (key, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(key, "must be finite and positive"));
            }
        }

        if !(0.0..=1.0).contains(&self.path_cutoff_factor) {
            return Err(invalid("path_cutoff_factor", "must be within 0.0..=1.0"));
        }
        if self.worker_threads == 0 {
            return Err(invalid("worker_threads", "must be at least 1"));
        }
        if self.max_nodes == 0 {
            return Err(invalid("max_nodes", "must be at least 1"));
        }
        if self.failure_max_attempts == 0 {
            return Err(invalid("failure_max_attempts", "must be at least 1"));
        }
        if self.teleport_step <= 0 {
            return Err(invalid("teleport_step", "must be positive"));
        }
        if self.teleport_min_distance <= 1 || self.teleport_max_distance < self.teleport_min_distance
        {
            return Err(invalid(
                "teleport_min_distance",
                "teleport range must satisfy 1 < min <= max",
            ));
        }

        // Longer falls and cheaper teleports would make the search heuristic
        // overestimate.
        if self.max_fall_height_no_water > MAX_ADMISSIBLE_FALL {
            return Err(ConfigError::InvalidValue {
                key: "max_fall_height_no_water".to_string(),
                reason: format!("must be at most {MAX_ADMISSIBLE_FALL}"),
            });
        }
        let longest_hop = f64::from(self.teleport_max_distance) * COST_HEURISTIC;
        if self.allow_teleport && self.teleport_cost < longest_hop {
            return Err(ConfigError::InvalidValue {
                key: "teleport_cost".to_string(),
                reason: format!(
                    "must be at least {longest_hop:.3} for teleports of up to {} blocks",
                    self.teleport_max_distance
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_config_is_valid_and_serializes() {
        let config = PathingConfig::default();
        config.validate().unwrap();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let restored: PathingConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, restored);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = PathingConfig::from_json(
            r#"{
                "allow_break": false,
                "primary_timeout_ms": 250,
                "avoid_breaking": ["Bedrock", "Glass"]
            }"#,
        )
        .unwrap();
        assert!(!config.allow_break);
        assert_eq!(config.primary_timeout_ms, 250);
        assert_eq!(config.avoid_breaking, vec![BlockState::Bedrock, BlockState::Glass]);
        assert_eq!(config.failure_timeout_ms, 2000);
        assert_eq!(config.worker_threads, 1);
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = PathingConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn zero_timeout_fails_validation() {
        let err = PathingConfig::from_json(r#"{ "primary_timeout_ms": 0 }"#).unwrap_err();
        assert!(
            matches!(&err, ConfigError::InvalidValue { key, .. } if key == "primary_timeout_ms"),
            "{err}"
        );
    }

    #[test]
    fn zero_worker_threads_fails_validation() {
        let config = PathingConfig {
            worker_threads: 0,
            ..PathingConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn nan_coefficient_fails_validation() {
        let config = PathingConfig {
            heuristic_weight: f64::NAN,
            ..PathingConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn falls_longer_than_the_heuristic_bound_fail_validation() {
        let config = PathingConfig {
            max_fall_height_no_water: MAX_ADMISSIBLE_FALL,
            ..PathingConfig::default()
        };
        config.validate().unwrap();
        for height in [MAX_ADMISSIBLE_FALL + 1, 20] {
            let config = PathingConfig {
                max_fall_height_no_water: height,
                ..PathingConfig::default()
            };
            let err = config.validate().unwrap_err();
            assert!(
                matches!(&err, ConfigError::InvalidValue { key, .. } if key == "max_fall_height_no_water"),
                "{err}"
            );
        }
    }

    #[test]
    fn teleport_cheaper_than_its_distance_fails_validation() {
        let cheap = PathingConfig {
            allow_teleport: true,
            teleport_max_distance: 32,
            teleport_cost: 60.0,
            ..PathingConfig::default()
        };
        let err = cheap.validate().unwrap_err();
        assert!(matches!(&err, ConfigError::InvalidValue { key, .. } if key == "teleport_cost"), "{err}");

        // Disabled teleports are not checked.
        PathingConfig {
            allow_teleport: false,
            ..cheap.clone()
        }
        .validate()
        .unwrap();
        PathingConfig {
            teleport_cost: 32.0 * COST_HEURISTIC,
            ..cheap
        }
        .validate()
        .unwrap();
    }

    #[test]
    fn overrides_replace_named_fields() {
        let overrides = json!({ "allow_parkour": false, "failure_multiplier": 3.0 });
        let serde_json::Value::Object(map) = overrides else {
            panic!("expected object");
        };
        let config = PathingConfig::default().with_overrides(&map).unwrap();
        assert!(!config.allow_parkour);
        assert_eq!(config.failure_multiplier, 3.0);
        assert!(config.allow_break);
    }

    #[test]
    fn override_with_unknown_key_fails() {
        let serde_json::Value::Object(map) = json!({ "allow_flying": true }) else {
            panic!("expected object");
        };
        let err = PathingConfig::default().with_overrides(&map).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKey(k) if k == "allow_flying"));
    }

    #[test]
    fn override_with_wrong_type_names_the_key() {
        let serde_json::Value::Object(map) = json!({ "max_nodes": "lots" }) else {
            panic!("expected object");
        };
        let err = PathingConfig::default().with_overrides(&map).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == "max_nodes"));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = PathingConfig::load("/nonexistent/pathing.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
