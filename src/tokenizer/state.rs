// this_file: src/tokenizer/state.rs

//! The tokenizer's internal state set.

/// Every state the [`super::Tokenizer`] can be in.
///
/// `Start` is the initial state. `Done` and `Error` are terminal: once
/// reached, [`super::Tokenizer::feed`] becomes a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Start,
    Done,
    Error,

    ArrayValue,
    ArrayComma,
    ObjectKey,
    ObjectColon,
    ObjectValue,
    ObjectComma,

    StringChar,
    StringEscape,
    StringU1,
    StringU2,
    StringU3,
    StringU4,

    NumMinus,
    NumZero,
    NumWhole,
    NumFrac0,
    NumFrac,
    NumExp0,
    NumExp,

    N,
    Nu,
    Nul,
    T,
    Tr,
    Tru,
    F,
    Fa,
    Fal,
    Fals,
}

impl State {
    /// True for [`State::Done`] and [`State::Error`].
    #[inline(always)]
    pub fn is_terminal(self) -> bool {
        matches!(self, State::Done | State::Error)
    }

    /// True while a string (key or value) is being read, i.e. content is
    /// being accumulated or an escape is in progress.
    #[inline(always)]
    pub fn is_in_string(self) -> bool {
        matches!(
            self,
            State::StringChar
                | State::StringEscape
                | State::StringU1
                | State::StringU2
                | State::StringU3
                | State::StringU4
        )
    }
}
