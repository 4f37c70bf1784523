use crate::foundation::error::DecodeError;
use crate::layout::slots::{LayerSlot, REFERENCE_ORDER};

/// One decoded identifier character: which variant to draw for which slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Selection {
    /// Slot the character position maps to.
    pub slot: LayerSlot,
    /// Zero-based index into the slot's variant list.
    pub variant: usize,
}

/// Ordered selections, one per identifier position, in draw order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct SelectionSequence(Vec<Selection>);

impl SelectionSequence {
    /// Wrap an explicit selection list.
    pub fn new(selections: Vec<Selection>) -> Self {
        Self(selections)
    }

    /// Number of selections.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Selections in draw order.
    pub fn as_slice(&self) -> &[Selection] {
        &self.0
    }

    /// Iterate selections in draw order.
    pub fn iter(&self) -> std::slice::Iter<'_, Selection> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a SelectionSequence {
    type Item = &'a Selection;
    type IntoIter = std::slice::Iter<'a, Selection>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Decode an identifier against the reference position order.
pub fn decode(identifier: &str) -> Result<SelectionSequence, DecodeError> {
    decode_with_order(&REFERENCE_ORDER, identifier)
}

/// Decode an identifier: character `i` is a hex digit (either case) whose value selects the
/// variant for `order[i]`.
///
/// Length is checked before any character, so a short identifier is always `BadLength`. Variant
/// bounds are not checked here; they depend on what was loaded.
pub fn decode_with_order(
    order: &[LayerSlot],
    identifier: &str,
) -> Result<SelectionSequence, DecodeError> {
    let actual = identifier.chars().count();
    if actual != order.len() {
        return Err(DecodeError::BadLength {
            expected: order.len(),
            actual,
        });
    }

    let selections = identifier
        .chars()
        .zip(order)
        .enumerate()
        .map(|(position, (character, &slot))| {
            character
                .to_digit(16)
                .map(|v| Selection {
                    slot,
                    variant: v as usize,
                })
                .ok_or(DecodeError::BadCharacter {
                    position,
                    character,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SelectionSequence(selections))
}

/// Encode a selection back into identifier form (lowercase hex).
///
/// Returns `None` when a variant index does not fit in one hex digit.
pub fn encode_identifier(selection: &SelectionSequence) -> Option<String> {
    selection
        .iter()
        .map(|s| u32::try_from(s.variant).ok().and_then(|v| char::from_digit(v, 16)))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/codec/identifier.rs"]
mod tests;
