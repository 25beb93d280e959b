use super::*;

#[test]
fn every_variant_uses_the_og_canvas_and_stays_in_bounds() {
    for v in Variant::ALL {
        let g = select_geometry(v);
        assert_eq!(g.variant, v);
        assert_eq!((g.canvas.width, g.canvas.height), (1200, 630));

        let bounds = g.canvas.bounds();
        if let Some(o) = g.overlay {
            assert!(!o.rect.is_empty(), "{v}");
            assert!(bounds.contains_rect(o.rect), "{v}: {:?}", o.rect);
        }
        if let Some(p) = g.panel {
            assert!(bounds.contains_rect(p.rect), "{v}: {:?}", p.rect);
        }
        assert!(g.text_origin_x < g.text_max_x, "{v}");
        assert!(g.text_max_x <= g.canvas.width, "{v}");
        assert!(g.title_y < g.body_top && g.body_top < g.body_bottom, "{v}");
        assert!(g.body_bottom < g.brand_y && g.brand_y < g.canvas.height, "{v}");
    }
}

#[test]
fn default_has_panel_and_no_overlay() {
    let g = select_geometry(Variant::Default);
    assert!(g.overlay.is_none());
    assert_eq!(g.text_origin_x, 60);
    assert_eq!(g.panel.unwrap().rect, PixelRect::new(40, 40, 1120, 550));
    assert!(!g.uses_dominant_color);
}

#[test]
fn image_background_covers_the_canvas() {
    let g = select_geometry(Variant::ImageBackground);
    let o = g.overlay.unwrap();
    assert_eq!(o.rect, g.canvas.bounds());
    assert_eq!(o.fit, FitMode::Cover);
    assert_eq!(o.role, OverlayRole::Background);
    assert!(g.panel.is_some());
    assert!(g.uses_dominant_color);
}

#[test]
fn corner_thumbnail_is_a_contained_square_with_padding() {
    let g = select_geometry(Variant::CornerThumbnail);
    let o = g.overlay.unwrap();
    assert_eq!(o.rect.w, o.rect.h);
    assert_eq!(o.fit, FitMode::Contain);
    assert_eq!(o.role, OverlayRole::Inset);
    assert!(!o.allow_upscale);
    assert_eq!(o.rect.right(), g.canvas.width - PADDING);
    assert_eq!(o.rect.y, PADDING);
    assert!(g.text_max_x <= o.rect.x);
    assert!(!g.uses_dominant_color);
}

#[test]
fn split_view_puts_photo_left_and_text_right_of_midpoint() {
    let g = select_geometry(Variant::SplitView);
    let o = g.overlay.unwrap();
    assert_eq!(o.rect, PixelRect::new(0, 0, 600, 630));
    assert_eq!(o.fit, FitMode::Cover);
    assert_eq!(g.text_origin_x, 600 + TEXT_INSET);
    assert!(g.panel.is_none());
}

#[test]
fn panel_shape_matches_rect() {
    let p = select_geometry(Variant::Default).panel.unwrap();
    let shape = p.shape();
    assert_eq!(shape.rect(), p.rect.to_kurbo());
    assert_eq!(shape.radii().top_left, PANEL_RADIUS);
}
