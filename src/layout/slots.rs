use std::fmt;

use crate::foundation::core::PlacementRect;
use crate::foundation::error::{PlumageError, PlumageResult};

/// Named position in the layered composite.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum LayerSlot {
    /// Eyes and beak.
    Beak,
    /// Head.
    Head,
    /// First tail feather.
    IndexFeather,
    /// Second tail feather.
    MiddleFeather,
    /// Third tail feather.
    RingFeather,
    /// Fourth tail feather.
    PinkyFeather,
    /// Feet.
    Feet,
    /// Wing.
    Wing,
}

impl LayerSlot {
    /// Every slot, in declaration order.
    pub const ALL: [LayerSlot; 8] = [
        LayerSlot::Beak,
        LayerSlot::Head,
        LayerSlot::IndexFeather,
        LayerSlot::MiddleFeather,
        LayerSlot::RingFeather,
        LayerSlot::PinkyFeather,
        LayerSlot::Feet,
        LayerSlot::Wing,
    ];

    /// Stable lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            LayerSlot::Beak => "beak",
            LayerSlot::Head => "head",
            LayerSlot::IndexFeather => "index_feather",
            LayerSlot::MiddleFeather => "middle_feather",
            LayerSlot::RingFeather => "ring_feather",
            LayerSlot::PinkyFeather => "pinky_feather",
            LayerSlot::Feet => "feet",
            LayerSlot::Wing => "wing",
        }
    }
}

impl fmt::Display for LayerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identifier position order of the reference layout: one position per slot, in declaration order.
pub const REFERENCE_ORDER: [LayerSlot; 8] = LayerSlot::ALL;

/// Background asset path of the reference layout.
pub const REFERENCE_BACKGROUND: &str = "bg/thanksgiving-2011-actual-size-bg-nolinks.png";

/// Default image asset path of the reference layout.
pub const REFERENCE_DEFAULT_IMAGE: &str = "00000000.png";

/// Where a slot's variants come from and where they are drawn.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SlotSpec {
    /// The slot.
    pub slot: LayerSlot,
    /// Logical collection holding the slot's variant images.
    pub collection: String,
    /// Destination rectangle on the background.
    pub rect: PlacementRect,
}

impl SlotSpec {
    fn reference(slot: LayerSlot, collection: &str, rect: PlacementRect) -> Self {
        Self {
            slot,
            collection: collection.to_string(),
            rect,
        }
    }
}

/// Fixed position -> slot table plus the asset locations it draws from.
///
/// Character `i` of an identifier selects the variant for `positions()[i]`, and layers are drawn
/// in position order, so the table also fixes the z-order.
///
/// Deserialization goes through [`Layout::new`], so a layout read from JSON is validated the same
/// way as one built in code.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "LayoutRepr")]
pub struct Layout {
    background: String,
    default_image: String,
    slots: Vec<SlotSpec>,
    positions: Vec<LayerSlot>,
}

#[derive(serde::Deserialize)]
struct LayoutRepr {
    background: String,
    default_image: String,
    slots: Vec<SlotSpec>,
    positions: Vec<LayerSlot>,
}

impl TryFrom<LayoutRepr> for Layout {
    type Error = PlumageError;

    fn try_from(repr: LayoutRepr) -> PlumageResult<Self> {
        Layout::new(
            repr.background,
            repr.default_image,
            repr.slots,
            repr.positions,
        )
    }
}

impl Layout {
    /// Build and validate a layout.
    ///
    /// Every slot named in `positions` needs exactly one [`SlotSpec`]; placement rectangles must
    /// be non-empty.
    pub fn new(
        background: impl Into<String>,
        default_image: impl Into<String>,
        slots: Vec<SlotSpec>,
        positions: Vec<LayerSlot>,
    ) -> PlumageResult<Self> {
        if positions.is_empty() {
            return Err(PlumageError::validation(
                "layout must have at least one position",
            ));
        }
        for (i, spec) in slots.iter().enumerate() {
            if slots[..i].iter().any(|s| s.slot == spec.slot) {
                return Err(PlumageError::validation(format!(
                    "slot '{}' is specified twice",
                    spec.slot
                )));
            }
            if spec.rect.is_empty() {
                return Err(PlumageError::validation(format!(
                    "slot '{}' has an empty placement",
                    spec.slot
                )));
            }
            if spec.collection.is_empty() {
                return Err(PlumageError::validation(format!(
                    "slot '{}' has no collection",
                    spec.slot
                )));
            }
        }
        if let Some(missing) = positions
            .iter()
            .find(|slot| !slots.iter().any(|s| s.slot == **slot))
        {
            return Err(PlumageError::validation(format!(
                "position references slot '{missing}' with no slot entry"
            )));
        }

        Ok(Self {
            background: background.into(),
            default_image: default_image.into(),
            slots,
            positions,
        })
    }

    /// Layout without the checks in [`Layout::new`].
    #[cfg(test)]
    pub(crate) fn new_unchecked(
        background: &str,
        default_image: &str,
        slots: Vec<SlotSpec>,
        positions: Vec<LayerSlot>,
    ) -> Self {
        Self {
            background: background.to_string(),
            default_image: default_image.to_string(),
            slots,
            positions,
        }
    }

    /// The eight-position turkey layout the service ships with.
    pub fn reference() -> Self {
        let r = PlacementRect::from_corners;
        Self {
            background: REFERENCE_BACKGROUND.to_string(),
            default_image: REFERENCE_DEFAULT_IMAGE.to_string(),
            slots: vec![
                SlotSpec::reference(LayerSlot::Beak, "eyes_beak", r(105, 104, 145, 148)),
                SlotSpec::reference(LayerSlot::Head, "heads", r(109, 50, 166, 152)),
                SlotSpec::reference(LayerSlot::IndexFeather, "index_feathers", r(136, 21, 180, 131)),
                SlotSpec::reference(
                    LayerSlot::MiddleFeather,
                    "middle_feathers",
                    r(159, 7, 201, 126),
                ),
                SlotSpec::reference(LayerSlot::RingFeather, "ring_feathers", r(188, 20, 230, 125)),
                SlotSpec::reference(LayerSlot::PinkyFeather, "pinky_feathers", r(216, 48, 258, 134)),
                SlotSpec::reference(LayerSlot::Feet, "feet", r(155, 176, 243, 213)),
                SlotSpec::reference(LayerSlot::Wing, "wing", r(169, 118, 250, 197)),
            ],
            positions: REFERENCE_ORDER.to_vec(),
        }
    }

    /// Logical path of the background image.
    pub fn background(&self) -> &str {
        &self.background
    }

    /// Logical path of the default image.
    pub fn default_image(&self) -> &str {
        &self.default_image
    }

    /// Slot specs in declaration order.
    pub fn slots(&self) -> &[SlotSpec] {
        &self.slots
    }

    /// Slot drawn for each identifier position.
    pub fn positions(&self) -> &[LayerSlot] {
        &self.positions
    }

    /// Required identifier length.
    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    /// [`SlotSpec`] for `slot`, if the layout has one.
    pub fn spec(&self, slot: LayerSlot) -> Option<&SlotSpec> {
        self.slots.iter().find(|s| s.slot == slot)
    }

    /// Placement rectangle for `slot`, if the layout has one.
    pub fn placement(&self, slot: LayerSlot) -> Option<PlacementRect> {
        self.spec(slot).map(|s| s.rect)
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::reference()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/slots.rs"]
mod tests;
