//! Marker types and traits of the capability lattice.
//!
//! GraphQL distinguishes between types which may receive values from a client
//! (input types), types which may appear in a response (output types), and
//! types which may do both. The traits in this module encode this distinction
//! at compile time, so that an output-only type used as an argument is a type
//! error rather than a runtime failure.

use std::fmt;

/// Capability of a type, known at runtime.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TypeCapability {
    /// Usable only as an argument or input field.
    Input,

    /// Usable only as a field type.
    Output,

    /// Usable both as input and as output.
    InputOutput,
}

impl TypeCapability {
    /// Indicates whether values of this capability may be received from a
    /// client.
    #[must_use]
    pub const fn is_input(self) -> bool {
        matches!(self, Self::Input | Self::InputOutput)
    }

    /// Indicates whether values of this capability may appear in a response.
    #[must_use]
    pub const fn is_output(self) -> bool {
        matches!(self, Self::Output | Self::InputOutput)
    }

    /// Indicates whether this capability covers everything `other` allows.
    #[must_use]
    pub const fn includes(self, other: Self) -> bool {
        (!other.is_input() || self.is_input()) && (!other.is_output() || self.is_output())
    }
}

impl fmt::Display for TypeCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Input => "an input type",
            Self::Output => "an output type",
            Self::InputOutput => "an input and output type",
        })
    }
}

/// Compile-time capability of a type.
pub trait Capability: Send + Sync + 'static {
    /// Runtime representation of this capability.
    const CAPABILITY: TypeCapability;
}

/// Marker of capabilities which may be used as input.
pub trait IsInput: Capability {}

/// Marker of capabilities which may be used as output.
pub trait IsOutput: Capability {}

/// Capability of input-only types, such as input objects.
#[derive(Clone, Copy, Debug)]
pub enum Input {}

/// Capability of output-only types, such as objects and interfaces.
#[derive(Clone, Copy, Debug)]
pub enum Output {}

/// Capability of types usable in both positions, such as scalars and enums.
#[derive(Clone, Copy, Debug)]
pub enum InputOutput {}

impl Capability for Input {
    const CAPABILITY: TypeCapability = TypeCapability::Input;
}

impl Capability for Output {
    const CAPABILITY: TypeCapability = TypeCapability::Output;
}

impl Capability for InputOutput {
    const CAPABILITY: TypeCapability = TypeCapability::InputOutput;
}

impl IsInput for Input {}
impl IsInput for InputOutput {}

impl IsOutput for Output {}
impl IsOutput for InputOutput {}
