//! Builder utilities for configuring SLPA runs.
//!
//! Exposes the execution strategy selection surface and the validation that
//! runs before a [`Slpa`] runtime is constructed.

use std::fmt;

use crate::{Result, error::SlpaError, slpa::Slpa};

/// Pruning threshold used when none is configured.
pub const DEFAULT_THRESHOLD: f64 = 0.1;
/// Superstep budget used when none is configured.
pub const DEFAULT_MAX_SUPERSTEPS: usize = 20;

/// Indicates how supersteps are scheduled across threads.
///
/// `Auto` runs in parallel when the crate is built with the `parallel`
/// feature and sequentially otherwise. Both produce identical results.
///
/// # Examples
/// ```
/// use slpa_core::ExecutionStrategy;
///
/// let strategy = ExecutionStrategy::Auto;
/// assert!(matches!(strategy, ExecutionStrategy::Auto));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    /// Let the library pick.
    #[default]
    Auto,
    /// Run every phase on the calling thread.
    Sequential,
    /// Run every phase on the Rayon pool.
    Parallel,
}

impl ExecutionStrategy {
    /// Resolves the strategy against the current build.
    ///
    /// # Errors
    /// Returns [`SlpaError::BackendUnavailable`] when `Parallel` is requested
    /// without the `parallel` feature.
    pub(crate) fn resolve_parallel(self) -> Result<bool> {
        match self {
            Self::Auto => Ok(cfg!(feature = "parallel")),
            Self::Sequential => Ok(false),
            #[cfg(feature = "parallel")]
            Self::Parallel => Ok(true),
            #[cfg(not(feature = "parallel"))]
            Self::Parallel => Err(SlpaError::BackendUnavailable {
                requested: Self::Parallel,
            }),
        }
    }
}

/// Normalised label frequency below which labels are pruned.
///
/// Always a finite value in `[0, 1]`.
///
/// # Examples
/// ```
/// use slpa_core::Threshold;
///
/// let threshold = Threshold::new(0.25)?;
/// assert_eq!(threshold.get(), 0.25);
/// assert!(Threshold::new(1.5).is_err());
/// assert!(Threshold::new(f64::NAN).is_err());
/// # Ok::<(), slpa_core::SlpaError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Threshold(f64);

impl Threshold {
    /// Validates `value`.
    ///
    /// # Errors
    /// Returns [`SlpaError::InvalidThreshold`] for NaN, infinities and values
    /// outside `[0, 1]`.
    pub fn new(value: f64) -> Result<Self> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(SlpaError::InvalidThreshold { got: value })
        }
    }

    /// Returns the raw fraction.
    #[rustfmt::skip]
    #[must_use]
    pub const fn get(self) -> f64 { self.0 }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(DEFAULT_THRESHOLD)
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Configures and constructs [`Slpa`] instances.
///
/// # Examples
/// ```
/// use slpa_core::{ExecutionStrategy, SlpaBuilder};
///
/// let slpa = SlpaBuilder::new()
///     .with_threshold(0.2)
///     .with_max_supersteps(50)
///     .with_execution_strategy(ExecutionStrategy::Sequential)
///     .build()?;
/// assert_eq!(slpa.threshold().get(), 0.2);
/// assert_eq!(slpa.max_supersteps(), 50);
/// assert_eq!(slpa.execution_strategy(), ExecutionStrategy::Sequential);
/// # Ok::<(), slpa_core::SlpaError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SlpaBuilder {
    threshold: f64,
    max_supersteps: usize,
    execution_strategy: ExecutionStrategy,
}

impl Default for SlpaBuilder {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            max_supersteps: DEFAULT_MAX_SUPERSTEPS,
            execution_strategy: ExecutionStrategy::Auto,
        }
    }
}

impl SlpaBuilder {
    /// Creates a builder populated with default parameters.
    ///
    /// # Examples
    /// ```
    /// use slpa_core::{ExecutionStrategy, SlpaBuilder};
    ///
    /// let builder = SlpaBuilder::new();
    /// assert_eq!(builder.threshold(), 0.1);
    /// assert_eq!(builder.max_supersteps(), 20);
    /// assert_eq!(builder.execution_strategy(), ExecutionStrategy::Auto);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the pruning threshold. Validated by [`Self::build`].
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Returns the configured pruning threshold.
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Overrides the superstep budget. Zero skips propagation entirely.
    #[must_use]
    pub fn with_max_supersteps(mut self, supersteps: usize) -> Self {
        self.max_supersteps = supersteps;
        self
    }

    /// Returns the configured superstep budget.
    #[must_use]
    pub fn max_supersteps(&self) -> usize {
        self.max_supersteps
    }

    /// Sets the execution strategy to use when running.
    #[must_use]
    pub fn with_execution_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.execution_strategy = strategy;
        self
    }

    /// Returns the currently configured execution strategy.
    #[must_use]
    pub fn execution_strategy(&self) -> ExecutionStrategy {
        self.execution_strategy
    }

    /// Validates the configuration and constructs a [`Slpa`] instance.
    ///
    /// # Errors
    /// Returns [`SlpaError::InvalidThreshold`] for thresholds outside
    /// `[0, 1]` and [`SlpaError::BackendUnavailable`] when the requested
    /// strategy is not compiled in.
    pub fn build(self) -> Result<Slpa> {
        let threshold = Threshold::new(self.threshold)?;
        let parallel = self.execution_strategy.resolve_parallel()?;
        Ok(Slpa::new(
            threshold,
            self.max_supersteps,
            self.execution_strategy,
            parallel,
        ))
    }
}
