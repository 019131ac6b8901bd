//! render_filter tests
//!
//! Tests for:
//! - Three-pass plan: downsample → vertical → horizontal
//! - Downsample target size, gutter UVs, effective scalar correction
//! - Skipped blur axes and the no-op pass-through
//! - Decal handling with and without device support
//! - Coverage hint expansion and missing snapshots
//! - Result placement (transform, sampler, opacity, blend state)

mod common;

use std::sync::Arc;

use common::{
    MissingSnapshotInput, RecordingInput, RecordingRenderer, approx_eq, inputs_of, map_point,
    rect_approx, vec2_approx,
};
use glam::{Mat4, UVec2, Vec2, Vec3};
use myth_blur::geometry::orthographic;
use myth_blur::{
    BlendMode, Entity, FilterContents, FilterInput, GaussianBlurFilter, MinMagFilter,
    PipelineKind, PrimitiveType, Rect, SamplerAddressMode, SamplerDescriptor, TileMode,
    calculate_blur_radius, scale_sigma,
};

const FULL: Rect = Rect::from_ltrb(0.0, 0.0, 100.0, 100.0);

fn blur(
    filter: &GaussianBlurFilter,
    renderer: &mut RecordingRenderer,
    input: RecordingInput,
    entity: &Entity,
) -> myth_blur::FilterOutput<common::FakeTexture> {
    let inputs = inputs_of(input);
    filter
        .render_filter(&inputs, renderer, entity, &Mat4::IDENTITY, &FULL, None)
        .expect("render")
        .expect("output")
}

// ============================================================================
// Pass plan
// ============================================================================

#[test]
fn sigma_ten_runs_three_passes_in_order() {
    let mut renderer = RecordingRenderer::new();
    let input = RecordingInput::new(renderer.texture(100, 100));
    let filter = GaussianBlurFilter::new(10.0, 10.0, TileMode::Clamp);

    let output = blur(&filter, &mut renderer, input, &Entity::new());

    let passes = &renderer.subpasses;
    assert_eq!(passes.len(), 3);
    assert_eq!(passes[0].pipeline, PipelineKind::TextureFill);
    assert_eq!(passes[1].pipeline, PipelineKind::GaussianBlur);
    assert_eq!(passes[2].pipeline, PipelineKind::GaussianBlur);

    // Each pass consumes the previous output.
    assert_eq!(passes[1].input_id, passes[0].output_id);
    assert_eq!(passes[2].input_id, passes[1].output_id);
    assert_eq!(output.texture.id, passes[2].output_id);

    for pass in passes {
        assert_eq!(pass.options.primitive_type, PrimitiveType::TriangleStrip);
        assert_eq!(pass.frame_info.mvp, orthographic(Vec2::ONE));
        assert_eq!(pass.frame_info.alpha, 1.0);
        assert_eq!(pass.frame_info.texture_sampler_y_coord_scale, 1.0);
    }
}

#[test]
fn downsample_target_is_rounded_padded_size() {
    let mut renderer = RecordingRenderer::new();
    let input = RecordingInput::new(renderer.texture(100, 100));
    let filter = GaussianBlurFilter::new(10.0, 10.0, TileMode::Clamp);

    blur(&filter, &mut renderer, input, &Entity::new());

    // padding 16 → padded 132; scale 4 / 9.6634 → 54.64 → 55
    let passes = &renderer.subpasses;
    assert_eq!(passes[0].size, UVec2::new(55, 55));
    assert_eq!(passes[1].size, UVec2::new(55, 55));
    assert_eq!(passes[2].size, UVec2::new(55, 55));
    assert!(passes[0].blur_info.is_none());
}

#[test]
fn downsample_samples_guttered_uvs() {
    let mut renderer = RecordingRenderer::new();
    let input = RecordingInput::new(renderer.texture(100, 100));
    let filter = GaussianBlurFilter::new(10.0, 10.0, TileMode::Clamp);

    blur(&filter, &mut renderer, input, &Entity::new());

    let vertices = &renderer.subpasses[0].vertices;
    assert_eq!(vertices[0].position, Vec2::ZERO);
    assert_eq!(vertices[3].position, Vec2::ONE);
    assert!(vec2_approx(vertices[0].texture_coords, Vec2::splat(-0.16)));
    assert!(vec2_approx(vertices[1].texture_coords, Vec2::new(1.16, -0.16)));
    assert!(vec2_approx(vertices[3].texture_coords, Vec2::splat(1.16)));
}

#[test]
fn blur_passes_are_corrected_by_effective_scalar() {
    let mut renderer = RecordingRenderer::new();
    let input = RecordingInput::new(renderer.texture(100, 100));
    let filter = GaussianBlurFilter::new(10.0, 10.0, TileMode::Clamp);

    blur(&filter, &mut renderer, input, &Entity::new());

    let effective = 55.0 / 132.0;
    let sigma = scale_sigma(10.0) * effective;
    let radius = calculate_blur_radius(scale_sigma(10.0)) * effective;

    let vertical = renderer.subpasses[1].blur_info.expect("vertical blur info");
    assert!(vec2_approx(vertical.blur_uv_offset, Vec2::new(0.0, 1.0 / 55.0)));
    assert!(approx_eq(vertical.blur_sigma, sigma));
    assert!(approx_eq(vertical.blur_radius, radius));
    assert_eq!(vertical.step_size, 1.0);

    let horizontal = renderer.subpasses[2].blur_info.expect("horizontal blur info");
    assert!(vec2_approx(horizontal.blur_uv_offset, Vec2::new(1.0 / 55.0, 0.0)));
    assert!(approx_eq(horizontal.blur_sigma, sigma));

    // Blur passes sample the whole intermediate texture.
    assert_eq!(renderer.subpasses[1].vertices[3].texture_coords, Vec2::ONE);
}

#[test]
fn small_sigma_does_not_downsample() {
    let mut renderer = RecordingRenderer::new();
    let input = RecordingInput::new(renderer.texture(100, 50));
    let filter = GaussianBlurFilter::new(2.0, 2.0, TileMode::Clamp);

    let output = blur(&filter, &mut renderer, input, &Entity::new());

    // padding ceil(2.57) = 3 on each side
    assert_eq!(renderer.subpasses[0].size, UVec2::new(106, 56));
    assert!(vec2_approx(map_point(&output.transform, Vec2::ZERO), Vec2::splat(-3.0)));
    assert!(vec2_approx(
        map_point(&output.transform, Vec2::new(106.0, 56.0)),
        Vec2::new(103.0, 53.0)
    ));
}

#[test]
fn zero_axis_skips_its_pass() {
    let mut renderer = RecordingRenderer::new();
    let input = RecordingInput::new(renderer.texture(100, 100));
    let filter = GaussianBlurFilter::new(10.0, 0.0, TileMode::Clamp);

    let output = blur(&filter, &mut renderer, input, &Entity::new());

    let passes = &renderer.subpasses;
    assert_eq!(passes.len(), 2);
    assert_eq!(passes[0].pipeline, PipelineKind::TextureFill);
    // No vertical padding: (132, 100) · 0.4139 → (55, 41)
    assert_eq!(passes[0].size, UVec2::new(55, 41));

    let horizontal = passes[1].blur_info.expect("horizontal blur info");
    assert!(vec2_approx(horizontal.blur_uv_offset, Vec2::new(1.0 / 55.0, 0.0)));
    assert_eq!(passes[1].input_id, passes[0].output_id);
    assert_eq!(output.texture.id, passes[1].output_id);
}

// ============================================================================
// No-op
// ============================================================================

#[test]
fn zero_sigma_passes_input_through_for_every_tile_mode() {
    for tile_mode in [TileMode::Clamp, TileMode::Repeat, TileMode::Mirror, TileMode::Decal] {
        let mut renderer = RecordingRenderer::new();
        let texture = renderer.texture(64, 64);
        let input = RecordingInput::new(Arc::clone(&texture));
        let filter = GaussianBlurFilter::new(0.0, 0.0, tile_mode);
        let entity = Entity::new()
            .with_blend_mode(BlendMode::Screen)
            .with_clip_depth(4);

        let output = blur(&filter, &mut renderer, input, &entity);

        assert!(Arc::ptr_eq(&output.texture, &texture), "{tile_mode:?}");
        assert!(renderer.subpasses.is_empty(), "{tile_mode:?}");
        assert_eq!(output.blend_mode, BlendMode::Screen);
        assert_eq!(output.clip_depth, 4);
    }
}

// ============================================================================
// Tile modes
// ============================================================================

#[test]
fn decal_without_support_uses_decal_pipeline_and_clamped_sampler() {
    let mut renderer = RecordingRenderer::new();
    let input = RecordingInput::new(renderer.texture(100, 100));
    let filter = GaussianBlurFilter::new(10.0, 10.0, TileMode::Decal);

    blur(&filter, &mut renderer, input, &Entity::new());

    let passes = &renderer.subpasses;
    assert_eq!(passes[0].sampler.width_address_mode, SamplerAddressMode::ClampToEdge);
    assert_eq!(passes[0].sampler.height_address_mode, SamplerAddressMode::ClampToEdge);
    assert_eq!(passes[1].pipeline, PipelineKind::GaussianBlurDecal);
    assert_eq!(passes[2].pipeline, PipelineKind::GaussianBlurDecal);
}

#[test]
fn decal_without_support_clamps_repeating_snapshot() {
    let mut renderer = RecordingRenderer::new();
    let repeat = SamplerDescriptor::linear_clamp().with_address_mode(SamplerAddressMode::Repeat);
    let input = RecordingInput::new(renderer.texture(100, 100)).with_sampler(repeat);
    let filter = GaussianBlurFilter::new(10.0, 10.0, TileMode::Decal);

    blur(&filter, &mut renderer, input, &Entity::new());

    let downsample = &renderer.subpasses[0];
    assert_eq!(downsample.sampler.width_address_mode, SamplerAddressMode::ClampToEdge);
    assert_eq!(downsample.sampler.height_address_mode, SamplerAddressMode::ClampToEdge);
}

#[test]
fn decal_with_support_uses_decal_sampler() {
    let mut renderer = RecordingRenderer::with_decal_support();
    let input = RecordingInput::new(renderer.texture(100, 100));
    let filter = GaussianBlurFilter::new(10.0, 10.0, TileMode::Decal);

    blur(&filter, &mut renderer, input, &Entity::new());

    let passes = &renderer.subpasses;
    assert_eq!(passes[0].sampler.width_address_mode, SamplerAddressMode::Decal);
    assert_eq!(passes[1].pipeline, PipelineKind::GaussianBlur);
    assert_eq!(passes[2].pipeline, PipelineKind::GaussianBlur);
}

#[test]
fn samplers_are_linear_and_follow_tile_mode() {
    let mut renderer = RecordingRenderer::new();
    let nearest = SamplerDescriptor::default();
    let input = RecordingInput::new(renderer.texture(100, 100)).with_sampler(nearest);
    let filter = GaussianBlurFilter::new(6.0, 6.0, TileMode::Mirror);

    blur(&filter, &mut renderer, input, &Entity::new());

    let passes = &renderer.subpasses;
    assert_eq!(passes[0].sampler.min_filter, MinMagFilter::Linear);
    assert_eq!(passes[0].sampler.mag_filter, MinMagFilter::Linear);
    assert_eq!(passes[0].sampler.width_address_mode, SamplerAddressMode::Mirror);
    // Blur passes keep the snapshot's addressing.
    assert_eq!(passes[1].sampler.min_filter, MinMagFilter::Linear);
    assert_eq!(passes[1].sampler.width_address_mode, SamplerAddressMode::ClampToEdge);
}

// ============================================================================
// Inputs & hints
// ============================================================================

#[test]
fn missing_snapshot_renders_nothing() {
    let mut renderer = RecordingRenderer::new();
    let inputs = inputs_of(MissingSnapshotInput);
    let filter = GaussianBlurFilter::new(10.0, 10.0, TileMode::Clamp);

    let output = filter
        .render_filter(&inputs, &mut renderer, &Entity::new(), &Mat4::IDENTITY, &FULL, None)
        .expect("render");
    assert!(output.is_none());
    assert!(renderer.subpasses.is_empty());
}

#[test]
fn empty_snapshot_texture_renders_nothing() {
    for (width, height) in [(0, 100), (100, 0)] {
        let mut renderer = RecordingRenderer::new();
        let input = RecordingInput::new(renderer.texture(width, height));
        let inputs = inputs_of(input);
        let filter = GaussianBlurFilter::new(10.0, 10.0, TileMode::Decal);

        let output = filter
            .render_filter(&inputs, &mut renderer, &Entity::new(), &Mat4::IDENTITY, &FULL, None)
            .expect("render");
        assert!(output.is_none(), "{width}x{height}");
        assert!(renderer.subpasses.is_empty());
    }
}

#[test]
fn no_inputs_renders_nothing() {
    let mut renderer = RecordingRenderer::new();
    let inputs: Vec<Arc<dyn FilterInput<RecordingRenderer>>> = Vec::new();
    let filter = GaussianBlurFilter::new(10.0, 10.0, TileMode::Clamp);

    let output = filter
        .render_filter(&inputs, &mut renderer, &Entity::new(), &Mat4::IDENTITY, &FULL, None)
        .expect("render");
    assert!(output.is_none());
}

#[test]
fn coverage_hint_is_expanded_by_padding() {
    let mut renderer = RecordingRenderer::new();
    let input = Arc::new(RecordingInput::new(renderer.texture(100, 100)));
    let inputs: Vec<Arc<dyn FilterInput<RecordingRenderer>>> = vec![input.clone()];
    let filter = GaussianBlurFilter::new(10.0, 10.0, TileMode::Clamp);
    let hint = Rect::from_ltrb(0.0, 0.0, 50.0, 50.0);

    filter
        .render_filter(&inputs, &mut renderer, &Entity::new(), &Mat4::IDENTITY, &FULL, Some(hint))
        .expect("render");
    filter
        .render_filter(&inputs, &mut renderer, &Entity::new(), &Mat4::IDENTITY, &FULL, None)
        .expect("render");

    let limits = input.requested_limits.borrow();
    assert_eq!(limits.len(), 2);
    let expanded = limits[0].expect("expanded hint");
    assert!(rect_approx(&expanded, &Rect::from_ltrb(-16.0, -16.0, 66.0, 66.0)));
    assert_eq!(limits[1], None);
}

#[test]
fn coverage_hint_expansion_follows_entity_scale() {
    let mut renderer = RecordingRenderer::new();
    let input = Arc::new(RecordingInput::new(renderer.texture(100, 100)));
    let inputs: Vec<Arc<dyn FilterInput<RecordingRenderer>>> = vec![input.clone()];
    let filter = GaussianBlurFilter::new(10.0, 10.0, TileMode::Clamp);
    let entity = Entity::new().with_transform(Mat4::from_scale(Vec3::new(2.0, 0.5, 1.0)));
    let hint = Rect::from_ltrb(0.0, 0.0, 50.0, 50.0);

    filter
        .render_filter(&inputs, &mut renderer, &entity, &Mat4::IDENTITY, &FULL, Some(hint))
        .expect("render");

    let expanded = input.requested_limits.borrow()[0].expect("expanded hint");
    assert!(rect_approx(&expanded, &Rect::from_ltrb(-32.0, -8.0, 82.0, 58.0)));
}

// ============================================================================
// Result placement
// ============================================================================

#[test]
fn result_transform_undoes_padding_and_downsample() {
    let mut renderer = RecordingRenderer::new();
    let input = RecordingInput::new(renderer.texture(100, 100));
    let filter = GaussianBlurFilter::new(10.0, 10.0, TileMode::Clamp);

    let output = blur(&filter, &mut renderer, input, &Entity::new());

    assert!(vec2_approx(map_point(&output.transform, Vec2::ZERO), Vec2::splat(-16.0)));
    assert!(vec2_approx(map_point(&output.transform, Vec2::splat(55.0)), Vec2::splat(116.0)));
    assert_eq!(output.sampler_descriptor, SamplerDescriptor::linear_clamp());
}

#[test]
fn result_keeps_snapshot_placement_and_opacity() {
    let mut renderer = RecordingRenderer::new();
    let input = RecordingInput::new(renderer.texture(100, 100)).with_opacity(0.25);
    let filter = GaussianBlurFilter::new(10.0, 10.0, TileMode::Clamp);
    let entity = Entity::new()
        .with_transform(Mat4::from_translation(Vec3::new(10.0, 20.0, 0.0)))
        .with_blend_mode(BlendMode::Multiply)
        .with_clip_depth(2);

    let output = blur(&filter, &mut renderer, input, &entity);

    assert!(vec2_approx(map_point(&output.transform, Vec2::ZERO), Vec2::new(-6.0, 4.0)));
    assert_eq!(output.opacity, 0.25);
    assert_eq!(output.blend_mode, BlendMode::Multiply);
    assert_eq!(output.clip_depth, 2);
}

#[test]
fn trait_object_renders_same_plan() {
    let mut renderer = RecordingRenderer::new();
    let inputs = inputs_of(RecordingInput::new(renderer.texture(100, 100)));
    let filter = GaussianBlurFilter::new(10.0, 10.0, TileMode::Clamp);
    let contents: Box<dyn FilterContents<RecordingRenderer>> = Box::new(filter);

    let output = contents
        .render_filter(&inputs, &mut renderer, &Entity::new(), &Mat4::IDENTITY, &FULL, None)
        .expect("render")
        .expect("output");

    assert_eq!(renderer.subpasses.len(), 3);
    assert_eq!(output.texture.size, UVec2::new(55, 55));
}
