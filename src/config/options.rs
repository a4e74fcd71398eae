use crate::store::ConnectBackoff;
use std::convert::TryFrom;
use tokio::time::Duration;

/// StoreOptions tunes how the coordination store connection is established. Every field is
/// optional; unset fields take the defaults below.
#[derive(Clone, Debug, Default)]
pub struct StoreOptions {
    pub base_delay: Option<Duration>,
    pub multiplier: Option<f64>,
    pub jitter: Option<f64>,
    pub max_delay: Option<Duration>,
    pub min_connect_timeout: Option<Duration>,
    pub dial_timeout: Option<Duration>,
}

#[derive(Clone, Debug)]
pub(crate) struct StoreOptionsValidated {
    pub base_delay: Duration,
    pub multiplier: f64,
    pub jitter: f64,
    pub max_delay: Duration,
    pub min_connect_timeout: Duration,
    pub dial_timeout: Duration,
}

impl StoreOptionsValidated {
    fn validate(&self) -> Result<(), &'static str> {
        if !(self.multiplier >= 1.0) {
            return Err("Backoff multiplier must be at least 1");
        }
        if !(0.0..1.0).contains(&self.jitter) {
            return Err("Backoff jitter must be in [0, 1)");
        }
        if self.base_delay > self.max_delay {
            return Err("Backoff base delay must not exceed the max delay");
        }
        if self.min_connect_timeout > self.dial_timeout {
            return Err("Minimum connect timeout must not exceed the dial timeout");
        }

        Ok(())
    }

    pub(crate) fn connect_backoff(&self) -> ConnectBackoff {
        ConnectBackoff {
            base_delay: self.base_delay,
            multiplier: self.multiplier,
            jitter: self.jitter,
            max_delay: self.max_delay,
        }
    }
}

impl TryFrom<StoreOptions> for StoreOptionsValidated {
    type Error = &'static str;

    fn try_from(options: StoreOptions) -> Result<Self, Self::Error> {
        let values = StoreOptionsValidated {
            base_delay: options.base_delay.unwrap_or(Duration::from_secs(1)),
            multiplier: options.multiplier.unwrap_or(1.1),
            jitter: options.jitter.unwrap_or(0.1),
            max_delay: options.max_delay.unwrap_or(Duration::from_secs(3)),
            min_connect_timeout: options.min_connect_timeout.unwrap_or(Duration::from_secs(3)),
            dial_timeout: options.dial_timeout.unwrap_or(Duration::from_secs(5)),
        };

        values.validate()?;
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let validated = StoreOptionsValidated::try_from(StoreOptions::default()).unwrap();
        assert_eq!(validated.base_delay, Duration::from_secs(1));
        assert_eq!(validated.max_delay, Duration::from_secs(3));
        assert_eq!(validated.min_connect_timeout, Duration::from_secs(3));
        assert_eq!(validated.dial_timeout, Duration::from_secs(5));
        assert!((validated.multiplier - 1.1).abs() < f64::EPSILON);
        assert!((validated.jitter - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_shrinking_multiplier() {
        let options = StoreOptions {
            multiplier: Some(0.5),
            ..StoreOptions::default()
        };
        assert!(StoreOptionsValidated::try_from(options).is_err());
    }

    #[test]
    fn rejects_jitter_out_of_range() {
        let options = StoreOptions {
            jitter: Some(1.0),
            ..StoreOptions::default()
        };
        assert!(StoreOptionsValidated::try_from(options).is_err());
    }

    #[test]
    fn rejects_base_above_max() {
        let options = StoreOptions {
            base_delay: Some(Duration::from_secs(10)),
            ..StoreOptions::default()
        };
        assert!(StoreOptionsValidated::try_from(options).is_err());
    }

    #[test]
    fn rejects_connect_timeout_above_dial_timeout() {
        let options = StoreOptions {
            dial_timeout: Some(Duration::from_secs(1)),
            ..StoreOptions::default()
        };
        assert!(StoreOptionsValidated::try_from(options).is_err());
    }
}
