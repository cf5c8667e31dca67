//! Конечный автомат порядка фаз
//!
//! `Initialized -> Uploaded -> Eliminating(0) -> ... -> Eliminating(n-1)
//!  -> Normalizing -> Downloaded -> Complete`
//!
//! Из фаз `Eliminating` и `Normalizing` можно выйти только после барьера
//! ([`Sequencer::settle`]).

use crate::error::{Error, Result};

/// Состояние запуска
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Initialized,
    Uploaded,
    Eliminating(usize),
    Normalizing,
    Downloaded,
    Complete,
}

#[derive(Debug, Clone)]
pub struct Sequencer {
    n: usize,
    state: State,
    settled: bool,
}

impl Sequencer {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            state: State::Initialized,
            settled: true,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Работа текущей фазы завершена и видна всем
    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Отмечает, что барьер текущей фазы пройден
    pub fn settle(&mut self) {
        self.settled = true;
    }

    /// Переход в `next`, если он допустим из текущего состояния
    pub fn advance(&mut self, next: State) -> Result<()> {
        let allowed = self.settled
            && match (self.state, next) {
                (State::Initialized, State::Uploaded) => true,
                (State::Uploaded, State::Eliminating(0)) => true,
                (State::Eliminating(k), State::Eliminating(next_k)) => next_k == k + 1 && next_k < self.n,
                (State::Eliminating(k), State::Normalizing) => k + 1 == self.n,
                (State::Normalizing, State::Downloaded) => true,
                (State::Downloaded, State::Complete) => true,
                _ => false,
            };

        if !allowed {
            return Err(Error::InvalidTransition { from: self.state, to: next });
        }

        log::trace!("{:?} -> {:?}", self.state, next);
        self.state = next;
        // в этих фазах на устройстве есть работа, ещё не прошедшая барьер
        self.settled = !matches!(next, State::Eliminating(_) | State::Normalizing);
        Ok(())
    }
}
