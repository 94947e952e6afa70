use async_trait::async_trait;

use super::{LocationProvider, Position};
use crate::error::LocationError;

/// Desktop machines rarely have a positioning device, so the last known
/// position comes from configuration. `None` behaves like a device that
/// has never obtained a fix.
#[derive(Debug, Clone, Default)]
pub struct FixedLocation {
    fix: Option<Position>,
}

impl FixedLocation {
    pub fn new(fix: Option<Position>) -> Self {
        Self { fix }
    }
}

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn last_known(&self) -> Result<Option<Position>, LocationError> {
        Ok(self.fix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_returns_configured_fix() {
        let fix = Position::new(48.8566, 2.3522);
        assert_eq!(FixedLocation::new(Some(fix)).last_known().await.unwrap(), Some(fix));
        assert_eq!(FixedLocation::default().last_known().await.unwrap(), None);
    }
}
