//! Integration tests for the track text format.
//!
//! Tests cover:
//! - Versioned save/load through the georeference
//! - Floor conversion of coordinates off the pixel grid
//! - Legacy files without a width header
//! - Failed loads leaving the track untouched
//! - Empty tracks writing nothing

mod common;

use std::fs;

use common::*;

#[test]
fn test_save_writes_versioned_format() -> anyhow::Result<()> {
    let (layout, _temp_dir) = create_test_layout();
    let georef = test_georef();
    let path = layout.root.join("track.txt");

    let mut track = make_track(&[(1, 2), (3, 4)]);
    track.inc_width(2);
    track.save(&path, &georef)?;

    let text = fs::read_to_string(&path)?;
    assert_eq!(text, "0 8\n2\n1500 3000\n2500 4000\n0\n");

    Ok(())
}

#[test]
fn test_save_and_load_round_trip() -> anyhow::Result<()> {
    let (layout, _temp_dir) = create_test_layout();
    let georef = test_georef();
    let path = layout.root.join("track.txt");

    let mut track = make_track(&[(10, 10), (20, 12), (40, 12)]);
    track.inc_width(4);
    track.switch_cut_mode();
    track.save(&path, &georef)?;

    let loaded = Track::from_file(&path, &georef)?;
    assert_eq!(loaded.points(), track.points());
    assert_eq!(loaded.cuts(), track.cuts());
    assert_eq!(loaded.width(), 10);
    assert_eq!(loaded.name(), Some(path.as_path()));
    assert!(!loaded.is_active());

    Ok(())
}

#[test]
fn test_load_floors_off_grid_coordinates() -> anyhow::Result<()> {
    let (layout, _temp_dir) = create_test_layout();
    let georef = test_georef();
    let path = layout.root.join("track.txt");

    write_file(&path, "0 6\n2\n1499 2999\n999 2001\n0\n");
    let track = Track::from_file(&path, &georef)?;
    assert_eq!(track.points(), &[Vertex::new(0, 1), Vertex::new(-1, 0)]);

    // Saving snaps the vertices to the grid
    track.save(&path, &georef)?;
    assert_eq!(fs::read_to_string(&path)?, "0 6\n2\n1000 2500\n500 2000\n0\n");

    Ok(())
}

#[test]
fn test_load_legacy_format_keeps_width() -> anyhow::Result<()> {
    let (layout, _temp_dir) = create_test_layout();
    let georef = test_georef();
    let path = layout.root.join("legacy.txt");
    write_file(&path, "2\n1500 3000\n2500 4000\n1\n1000 2000\n");

    let fresh = Track::from_file(&path, &georef)?;
    assert_eq!(fresh.width(), 6);
    assert_eq!(fresh.points(), &[Vertex::new(1, 2), Vertex::new(3, 4)]);
    assert_eq!(fresh.cuts(), &[Vertex::new(0, 0)]);

    let mut widened = Track::new();
    widened.inc_width(6);
    widened.load(&path, &georef)?;
    assert_eq!(widened.width(), 12);

    Ok(())
}

#[test]
fn test_load_replaces_content() -> anyhow::Result<()> {
    let (layout, _temp_dir) = create_test_layout();
    let georef = test_georef();
    let path = layout.root.join("track.txt");
    write_file(&path, "0 6\n1\n1500 3000\n0\n");

    let mut track = make_track(&[(7, 7), (8, 8), (9, 9)]);
    track.load(&path, &georef)?;
    assert_eq!(track.points(), &[Vertex::new(1, 2)]);
    assert_eq!(track.active_index(), None);

    Ok(())
}

#[test]
fn test_failed_load_leaves_track_untouched() -> anyhow::Result<()> {
    let (layout, _temp_dir) = create_test_layout();
    let georef = test_georef();
    let mut track = make_track(&[(1, 1), (2, 2)]);

    let missing = layout.root.join("missing.txt");
    assert!(matches!(track.load(&missing, &georef), Err(Error::Io(_))));
    assert_eq!(track.points().len(), 2);

    let malformed = layout.root.join("malformed.txt");
    write_file(&malformed, "0 6\n2\n1500 abc\n");
    match track.load(&malformed, &georef) {
        Err(Error::Parse { line, token }) => {
            assert_eq!(line, 3);
            assert_eq!(token, "abc");
        }
        other => panic!("Expected parse error, got {:?}", other),
    }

    let truncated = layout.root.join("truncated.txt");
    write_file(&truncated, "0 6\n2\n1500 3000\n");
    assert!(matches!(
        track.load(&truncated, &georef),
        Err(Error::UnexpectedEof(_))
    ));

    assert_eq!(track.points(), &[Vertex::new(1, 1), Vertex::new(2, 2)]);
    assert_eq!(track.active_index(), Some(1));
    assert_eq!(track.name(), None);

    Ok(())
}

#[test]
fn test_empty_track_writes_nothing() -> anyhow::Result<()> {
    let (layout, _temp_dir) = create_test_layout();
    let georef = test_georef();
    let path = layout.root.join("empty.txt");

    Track::new().save(&path, &georef)?;
    assert!(!path.exists());

    Ok(())
}

#[test]
fn test_save_last_creates_roads_directory() -> anyhow::Result<()> {
    let (layout, _temp_dir) = create_test_layout();
    let georef = test_georef();

    make_track(&[(0, 0), (4, 4)]).save_last(&layout, &georef)?;
    let loaded = Track::from_file(layout.last_track(), &georef)?;
    assert_eq!(loaded.points().len(), 2);

    Ok(())
}

#[test]
fn test_round_trip_on_grid_is_identity() -> anyhow::Result<()> {
    let (layout, _temp_dir) = create_test_layout();
    let georef = test_georef();
    let path = layout.root.join("track.txt");

    make_track(&[(0, 0), (2, 0)]).save(&path, &georef)?;
    assert_eq!(fs::read_to_string(&path)?, "0 6\n2\n1000 2000\n2000 2000\n0\n");

    let loaded = Track::from_file(&path, &georef)?;
    assert_eq!(loaded.points(), &[Vertex::new(0, 0), Vertex::new(2, 0)]);
    assert!(loaded.cuts().is_empty());

    Ok(())
}

#[test]
fn test_out_of_range_coordinate_is_rejected() -> anyhow::Result<()> {
    let (layout, _temp_dir) = create_test_layout();
    let georef = test_georef();
    let path = layout.root.join("far.txt");

    // 2^32 + 3 pixels east of the origin
    let far_x = ORIGIN_X + SCALE * ((1i64 << 32) + 3);
    write_file(&path, &format!("0 6\n1\n{} 2000\n0\n", far_x));

    let mut track = make_track(&[(1, 1)]);
    assert!(matches!(
        track.load(&path, &georef),
        Err(Error::CoordinateOutOfRange { x, .. }) if x == far_x
    ));
    assert_eq!(track.points(), &[Vertex::new(1, 1)]);

    Ok(())
}
