//! Reference-counted arithmetic context.
//!
//! The numeric constants table is process-wide: it is built when the first handle is
//! acquired and dropped when the last handle goes away. Acquisition and release go
//! through a single mutex; nothing else about a conversion is serialized by it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Constants shared by every live conversion.
#[derive(Debug, PartialEq)]
pub struct Constants {
    /// Absolute floor below which a scaled value is always treated as zero
    /// (16 machine epsilons).
    pub almost_zero: f64,
}

impl Constants {
    fn init() -> Self {
        Self {
            almost_zero: 16.0 * f64::EPSILON,
        }
    }
}

struct Registry {
    live: usize,
    constants: Option<Arc<Constants>>,
}

static REGISTRY: Mutex<Registry> = Mutex::new(Registry {
    live: 0,
    constants: None,
});

fn registry() -> MutexGuard<'static, Registry> {
    REGISTRY.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle keeping the shared constants alive.
#[derive(Debug)]
pub struct ArithmeticContext {
    constants: Arc<Constants>,
}

impl ArithmeticContext {
    pub fn acquire() -> Self {
        let mut reg = registry();
        let constants = match &reg.constants {
            Some(c) => Arc::clone(c),
            None => {
                let c = Arc::new(Constants::init());
                tracing::debug!("arithmetic constants initialised");
                reg.constants = Some(Arc::clone(&c));
                c
            }
        };
        reg.live += 1;
        Self { constants }
    }

    #[inline]
    pub fn constants(&self) -> &Constants {
        &self.constants
    }

    /// Number of handles currently alive in the process.
    pub fn live_count() -> usize {
        registry().live
    }

    #[cfg(test)]
    pub(crate) fn shares_table_with(&self, other: &ArithmeticContext) -> bool {
        Arc::ptr_eq(&self.constants, &other.constants)
    }
}

impl Clone for ArithmeticContext {
    fn clone(&self) -> Self {
        let mut reg = registry();
        reg.live += 1;
        Self {
            constants: Arc::clone(&self.constants),
        }
    }
}

impl Drop for ArithmeticContext {
    fn drop(&mut self) {
        let mut reg = registry();
        reg.live = reg.live.saturating_sub(1);
        if reg.live == 0 {
            reg.constants = None;
            tracing::debug!("arithmetic constants released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_share_one_table_while_alive() {
        let a = ArithmeticContext::acquire();
        let b = ArithmeticContext::acquire();
        let c = b.clone();
        assert!(a.shares_table_with(&b));
        assert!(b.shares_table_with(&c));
        assert!(ArithmeticContext::live_count() >= 3);
        assert_eq!(a.constants().almost_zero, 16.0 * f64::EPSILON);
    }

    #[test]
    fn count_tracks_acquire_and_release() {
        let a = ArithmeticContext::acquire();
        let with_a = ArithmeticContext::live_count();
        assert!(with_a >= 1);
        let b = ArithmeticContext::acquire();
        drop(b);
        // Other tests may hold handles concurrently; ours is still counted.
        assert!(ArithmeticContext::live_count() >= 1);
        drop(a);
    }
}
