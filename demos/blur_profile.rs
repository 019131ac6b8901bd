//! Blurs a hard-edged bar on the GPU and prints the alpha profile across it.
//!
//! ```text
//! cargo run --example blur_profile -- '{ "sigma_x": 6.0, "tile_mode": "clamp" }'
//! ```

use std::sync::Arc;

use glam::{Mat4, UVec2};
use myth_blur::{
    BackendSettings, BlurSettings, Entity, FilterInput, GpuTexture, TextureFilterInput,
    WgpuSubpassRenderer,
};

const WIDTH: u32 = 64;
const HEIGHT: u32 = 8;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let settings = match std::env::args().nth(1) {
        Some(json) => BlurSettings::from_json(&json)?,
        None => BlurSettings::uniform(4.0),
    };
    let filter = settings.into_filter()?;

    let mut renderer = pollster::block_on(WgpuSubpassRenderer::headless(BackendSettings {
        label_prefix: Some("Profile".to_string()),
        ..Default::default()
    }))?;

    // Opaque bar over the middle third.
    let mut pixels = vec![0u8; (WIDTH * HEIGHT * 4) as usize];
    for (i, px) in pixels.chunks_exact_mut(4).enumerate() {
        let x = i as u32 % WIDTH;
        if (WIDTH / 3..2 * WIDTH / 3).contains(&x) {
            px.copy_from_slice(&[255, 255, 255, 255]);
        }
    }
    let source = renderer.upload_rgba8(UVec2::new(WIDTH, HEIGHT), &pixels, "Bar")?;

    let inputs: Vec<Arc<dyn FilterInput<WgpuSubpassRenderer>>> =
        vec![Arc::new(TextureFilterInput::new(source))];
    let entity = Entity::new();
    let coverage = filter
        .filter_coverage(&inputs, &entity, &Mat4::IDENTITY)
        .unwrap_or_default();

    let Some(output) =
        filter.render_filter(&inputs, &mut renderer, &entity, &Mat4::IDENTITY, &coverage, None)?
    else {
        println!("nothing to draw");
        return Ok(());
    };

    let size = output.texture.size();
    let blurred = renderer.read_rgba8(&output.texture)?;
    let row = size.y / 2;

    println!("settings: {}", settings.to_json()?);
    println!("output {size}, placed by {:?}", output.transform);
    for x in 0..size.x {
        let alpha = blurred[((row * size.x + x) * 4 + 3) as usize];
        println!("{x:3} {alpha:3} {}", "#".repeat(usize::from(alpha) / 8));
    }

    renderer.end_frame();
    Ok(())
}
