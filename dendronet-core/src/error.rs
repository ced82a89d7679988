//! Error types for the dendronet core library.
//!
//! Defines the error enum exposed by the public API, the descriptors used to
//! identify offending inputs, and a convenient result alias.

use std::{fmt, sync::Arc};

use thiserror::Error;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// The family of per-node input an [`ArrayId`] refers to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ArrayKind {
    /// A square connectivity matrix.
    Matrix,
    /// A scalar node-data array.
    NodeData,
    /// A node-name array.
    NodeNames,
    /// A node display-order array.
    NodeOrder,
}

impl ArrayKind {
    /// Returns a lowercase description used in diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Matrix => "matrix",
            Self::NodeData => "node data",
            Self::NodeNames => "node names",
            Self::NodeOrder => "node order",
        }
    }
}

/// Identifies one loaded matrix or per-node array by kind, position and label.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ArrayId {
    /// Kind of input.
    pub kind: ArrayKind,
    /// Position of the input within its list.
    pub position: usize,
    /// User-facing label attached to the input.
    pub label: Arc<str>,
}

impl ArrayId {
    /// Creates a new identifier.
    #[must_use]
    pub fn new(kind: ArrayKind, position: usize, label: impl Into<Arc<str>>) -> Self {
        Self {
            kind,
            position,
            label: label.into(),
        }
    }
}

impl fmt::Display for ArrayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} (`{}`)", self.kind.as_str(), self.position, self.label)
    }
}

/// Renders the optional row of a [`NetworkError::ShapeMismatch`].
struct InRow(Option<usize>);

impl From<&Option<usize>> for InRow {
    fn from(row: &Option<usize>) -> Self {
        Self(*row)
    }
}

impl fmt::Display for InRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(row) => write!(f, " in row {row}"),
            None => Ok(()),
        }
    }
}

/// Error type produced while building, mutating or querying a
/// [`crate::Network`].
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum NetworkError {
    /// A matrix or per-node array disagreed with the network's node count.
    #[error(
        "{array} has length {actual}{} but the network has {expected} nodes",
        InRow::from(.row)
    )]
    ShapeMismatch {
        /// The offending input.
        array: ArrayId,
        /// Row of a matrix whose length was wrong, if the row count was fine.
        row: Option<usize>,
        /// Declared node count.
        expected: usize,
        /// Observed length.
        actual: usize,
    },
    /// Two parallel lists (for example values and labels) differed in length.
    #[error("{what} has {actual} entries but {expected} were expected")]
    LengthMismatch {
        /// Description of the mismatched list.
        what: &'static str,
        /// Length dictated by the paired list.
        expected: usize,
        /// Observed length.
        actual: usize,
    },
    /// A field without a default was not supplied.
    #[error("missing required field `{field}`")]
    MissingRequiredField {
        /// Name of the missing field.
        field: &'static str,
    },
    /// An index was outside the valid domain of a setter or query.
    #[error("{target} index {index} is out of range (length {len})")]
    IndexOutOfRange {
        /// Which index space was addressed.
        target: &'static str,
        /// Supplied index.
        index: usize,
        /// Number of valid indices.
        len: usize,
    },
    /// A linkage row could not be turned into a dendrogram merge.
    #[error("malformed linkage at row {row}: {reason}")]
    MalformedLinkage {
        /// Zero-based row of the linkage table.
        row: usize,
        /// Human-readable description of the defect.
        reason: String,
    },
    /// The first matrix declared zero nodes.
    #[error("network `{network}` contains no nodes")]
    EmptyNetwork {
        /// Identifier for the empty network.
        network: Arc<str>,
    },
}

define_error_codes! {
    /// Stable codes describing [`NetworkError`] variants.
    enum NetworkErrorCode for NetworkError {
        /// A matrix or per-node array disagreed with the node count.
        ShapeMismatch => ShapeMismatch { .. } => "NETWORK_SHAPE_MISMATCH",
        /// Two parallel lists differed in length.
        LengthMismatch => LengthMismatch { .. } => "NETWORK_LENGTH_MISMATCH",
        /// A required field was not supplied.
        MissingRequiredField => MissingRequiredField { .. } => "NETWORK_MISSING_REQUIRED_FIELD",
        /// An index was outside its valid domain.
        IndexOutOfRange => IndexOutOfRange { .. } => "NETWORK_INDEX_OUT_OF_RANGE",
        /// A linkage row could not be resolved.
        MalformedLinkage => MalformedLinkage { .. } => "NETWORK_MALFORMED_LINKAGE",
        /// The network declared zero nodes.
        EmptyNetwork => EmptyNetwork { .. } => "NETWORK_EMPTY",
    }
}

impl NetworkError {
    pub(crate) fn out_of_range(target: &'static str, index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { target, index, len }
    }

    pub(crate) fn linkage(row: usize, reason: impl Into<String>) -> Self {
        Self::MalformedLinkage {
            row,
            reason: reason.into(),
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, NetworkError>;
