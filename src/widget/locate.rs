use crate::core::geo::LatLng;
use async_trait::async_trait;

/// Why the device position could not be obtained. The messages are shown to
/// the user as form errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocateError {
    #[error("Geolocation is not supported on this device")]
    Unsupported,

    #[error("Location permission was denied")]
    Denied,

    #[error("Timed out while getting your location")]
    Timeout,

    #[error("Could not get your location: {0}")]
    Unavailable(String),
}

/// Source of the device's current position
#[async_trait]
pub trait PositionProvider: Send + Sync + 'static {
    async fn current_position(&self) -> Result<LatLng, LocateError>;
}

/// Always reports the same position
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub LatLng);

#[async_trait]
impl PositionProvider for FixedPosition {
    async fn current_position(&self) -> Result<LatLng, LocateError> {
        if !self.0.is_valid() {
            return Err(LocateError::Unavailable(format!(
                "invalid position {}",
                self.0
            )));
        }
        Ok(self.0)
    }
}

/// For hosts without location services
#[derive(Debug, Clone, Copy, Default)]
pub struct Unsupported;

#[async_trait]
impl PositionProvider for Unsupported {
    async fn current_position(&self) -> Result<LatLng, LocateError> {
        Err(LocateError::Unsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_position() {
        let here = LatLng::new(28.5562, 77.1);
        assert_eq!(FixedPosition(here).current_position().await, Ok(here));
        assert!(matches!(
            FixedPosition(LatLng::new(95.0, 0.0)).current_position().await,
            Err(LocateError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_unsupported() {
        let err = Unsupported.current_position().await.unwrap_err();
        assert_eq!(err, LocateError::Unsupported);
        assert_eq!(err.to_string(), "Geolocation is not supported on this device");
    }
}
