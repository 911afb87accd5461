//! Conversions bridging `charger_config` types to `charger_core` types.

use crate::error::ChargerError;
use crate::rank::RankScope;
use crate::thresholds::VoltageThresholds;

impl TryFrom<&charger_config::ThresholdsCfg> for VoltageThresholds {
    type Error = ChargerError;
    fn try_from(c: &charger_config::ThresholdsCfg) -> Result<Self, Self::Error> {
        VoltageThresholds::new(c.present_low, c.present_high)
    }
}

impl From<charger_config::RankScope> for RankScope {
    fn from(s: charger_config::RankScope) -> Self {
        match s {
            charger_config::RankScope::Populated => RankScope::Populated,
            charger_config::RankScope::All => RankScope::All,
        }
    }
}
