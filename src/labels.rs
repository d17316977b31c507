//! Categorical labels shared by state buckets and actions
//!
//! Every discrete category in the engine (range buckets, health bands, action
//! names, ...) is a fieldless enum with a fixed declaration order and a stable
//! snake_case label. The order doubles as the tie-break order for actions and
//! the label is the only form that reaches disk.

use std::{fmt, hash::Hash};

/// A fieldless enum with a stable textual label per variant.
pub trait Label: Copy + Eq + Ord + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// All variants in declaration order.
    const ALL: &'static [Self];

    /// Snake-case label used in persisted keys and snapshots.
    fn label(self) -> &'static str;

    /// Position of this variant in [`Label::ALL`].
    fn index(self) -> usize;

    /// Look up a variant by its exact label.
    fn from_label(text: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.label() == text)
    }
}

/// Declare a label enum together with its [`Label`] and `Display` impls.
macro_rules! labels {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        $vis enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $crate::labels::Label for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }

            fn index(self) -> usize {
                self as usize
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str($crate::labels::Label::label(*self))
            }
        }
    };
}

pub(crate) use labels;

/// Split the leading label of type `L` off an underscore-joined key.
///
/// Labels may themselves contain underscores, so the longest label that ends
/// on a component boundary wins. Returns the label and the remainder with the
/// separator removed.
pub(crate) fn split_label<L: Label>(input: &str) -> Option<(L, &str)> {
    let mut best: Option<(L, &str)> = None;
    for &candidate in L::ALL {
        let text = candidate.label();
        let Some(rest) = input.strip_prefix(text) else {
            continue;
        };
        let rest = if rest.is_empty() {
            rest
        } else if let Some(stripped) = rest.strip_prefix('_') {
            stripped
        } else {
            continue;
        };
        if best.is_none_or(|(current, _)| current.label().len() < text.len()) {
            best = Some((candidate, rest));
        }
    }
    best
}
