use chrono_tz::Tz;
use serenity::all::{ChannelId, GuildId, RoleId};
use std::env;

use crate::utils::parse_duration;

const DEFAULT_MAX_DURATION: &str = "30d";
const DEFAULT_MAX_WINNERS: u32 = 50;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub discord_token: String,
    /// Register commands on this guild only; global when unset.
    pub guild_id: Option<GuildId>,
    pub allowed_role_ids: Vec<RoleId>,
    pub log_channel_id: Option<ChannelId>,
    pub max_duration_token: String,
    pub max_duration_ms: u64,
    pub max_winners: u32,
    pub display_tz: Tz,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let max_duration_token =
            env::var("GIVEAWAY_MAX_DURATION").unwrap_or_else(|_| DEFAULT_MAX_DURATION.into());
        let max_duration_ms = parse_duration(&max_duration_token)
            .map_err(|e| anyhow::anyhow!("GIVEAWAY_MAX_DURATION: {e}"))?;

        Ok(Self {
            discord_token: env::var("DISCORD_TOKEN")
                .map_err(|_| anyhow::anyhow!("DISCORD_TOKEN must be set"))?,
            guild_id: parse_snowflake("GUILD_ID", env::var("GUILD_ID").ok())?.map(GuildId::new),
            allowed_role_ids: parse_role_ids(&env::var("GIVEAWAY_ROLE_IDS").unwrap_or_default()),
            log_channel_id: parse_snowflake("LOG_CHANNEL_ID", env::var("LOG_CHANNEL_ID").ok())?
                .map(ChannelId::new),
            max_duration_token,
            max_duration_ms,
            max_winners: env::var("GIVEAWAY_MAX_WINNERS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n| *n >= 1)
                .unwrap_or(DEFAULT_MAX_WINNERS),
            display_tz: env::var("DISPLAY_TZ")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(chrono_tz::Europe::Paris),
        })
    }

    /// True when any of `roles` is in the allowed set. An empty allowed set
    /// authorises nobody.
    pub fn is_authorized(&self, roles: &[RoleId]) -> bool {
        self.allowed_role_ids.iter().any(|r| roles.contains(r))
    }
}

fn parse_snowflake(name: &str, raw: Option<String>) -> anyhow::Result<Option<u64>> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => match s.parse::<u64>() {
            Ok(id) if id != 0 => Ok(Some(id)),
            _ => Err(anyhow::anyhow!("{name} is not a valid id: {s}")),
        },
    }
}

fn parse_role_ids(raw: &str) -> Vec<RoleId> {
    raw.split(',')
        .map(str::trim)
        .filter_map(|s| s.parse::<u64>().ok())
        .filter(|id| *id != 0)
        .map(RoleId::new)
        .collect()
}

#[cfg(test)]
impl AppConfig {
    pub fn for_tests(roles: &[u64]) -> Self {
        Self {
            discord_token: String::new(),
            guild_id: None,
            allowed_role_ids: roles.iter().copied().map(RoleId::new).collect(),
            log_channel_id: None,
            max_duration_token: DEFAULT_MAX_DURATION.into(),
            max_duration_ms: 30 * 86_400_000,
            max_winners: DEFAULT_MAX_WINNERS,
            display_tz: chrono_tz::Europe::Paris,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role_ids() {
        let ids = parse_role_ids("1459874963795345650, 1459875200069013597,,x");
        assert_eq!(
            ids,
            vec![RoleId::new(1459874963795345650), RoleId::new(1459875200069013597)]
        );
    }

    #[test]
    fn test_parse_snowflake() {
        assert_eq!(parse_snowflake("X", None).unwrap(), None);
        assert_eq!(parse_snowflake("X", Some(" ".into())).unwrap(), None);
        assert_eq!(parse_snowflake("X", Some("42".into())).unwrap(), Some(42));
        assert!(parse_snowflake("X", Some("abc".into())).is_err());
        assert!(parse_snowflake("X", Some("0".into())).is_err());
    }

    #[test]
    fn test_is_authorized() {
        let cfg = AppConfig::for_tests(&[10, 20]);
        assert!(cfg.is_authorized(&[RoleId::new(5), RoleId::new(20)]));
        assert!(!cfg.is_authorized(&[RoleId::new(5)]));
        assert!(!cfg.is_authorized(&[]));

        let nobody = AppConfig::for_tests(&[]);
        assert!(!nobody.is_authorized(&[RoleId::new(10)]));
    }
}
