//! Lazy materialization of aggregate geometry coordinate sequences.
//!
//! A decoded aggregate geometry (LineString, Polygon, MultiPoint,
//! MultiLineString, MultiPolygon) holds a view over its source bytes until
//! the first accessor call, at which point the body is parsed once and the
//! result is cached. The source bytes are owned (`Arc<[u8]>`) so the pending
//! view outlives the geometry regardless of where the original blob came
//! from.

use std::cell::RefCell;
use std::sync::Arc;

use crate::error::Result;

enum State<T> {
    Pending(Arc<[u8]>),
    Done(T),
}

/// Interior-mutable `Pending | Materialized` cell. The accessor that drives
/// the transition is idempotent: once materialized, later calls just clone
/// the cached value.
pub(crate) struct Lazy<T: Clone> {
    state: RefCell<State<T>>,
}

impl<T: Clone> Lazy<T> {
    pub(crate) fn pending(bytes: Arc<[u8]>) -> Self {
        Lazy {
            state: RefCell::new(State::Pending(bytes)),
        }
    }

    pub(crate) fn done(value: T) -> Self {
        Lazy {
            state: RefCell::new(State::Done(value)),
        }
    }

    /// Materialize (if necessary) and return a clone of the cached value.
    pub(crate) fn get(&self, decode: impl FnOnce(&[u8]) -> Result<T>) -> Result<T> {
        {
            if let State::Done(value) = &*self.state.borrow() {
                log::trace!("lazy geometry body already materialized");
                return Ok(value.clone());
            }
        }
        let bytes = match &*self.state.borrow() {
            State::Pending(bytes) => bytes.clone(),
            State::Done(_) => unreachable!(),
        };
        log::trace!("materializing lazy geometry body ({} bytes)", bytes.len());
        let value = decode(&bytes)?;
        *self.state.borrow_mut() = State::Done(value.clone());
        Ok(value)
    }
}
