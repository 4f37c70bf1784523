use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        PlumageError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        PlumageError::from(DecodeError::BadLength {
            expected: 8,
            actual: 7
        })
        .to_string()
        .contains("decode error:")
    );
    assert!(
        PlumageError::from(RenderError::IndexOutOfRange {
            slot: LayerSlot::Beak,
            index: 15,
            len: 3
        })
        .to_string()
        .contains("render error:")
    );
    assert!(
        PlumageError::from(LoadError::Read {
            path: "bg.png".to_string(),
            reason: "gone".to_string()
        })
        .to_string()
        .contains("load error:")
    );
}

#[test]
fn index_out_of_range_names_slot_and_bounds() {
    let msg = RenderError::IndexOutOfRange {
        slot: LayerSlot::Wing,
        index: 12,
        len: 4,
    }
    .to_string();
    assert!(msg.contains("wing"));
    assert!(msg.contains("12 >= 4"));
}

#[test]
fn only_decode_errors_are_client_errors() {
    assert!(
        PlumageError::from(DecodeError::BadCharacter {
            position: 0,
            character: 'g'
        })
        .is_client_error()
    );
    assert!(
        !PlumageError::from(RenderError::MissingPlacement {
            slot: LayerSlot::Feet
        })
        .is_client_error()
    );
    assert!(!PlumageError::validation("x").is_client_error());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = PlumageError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
