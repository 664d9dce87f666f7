use ascii_folio::ascii::quantize::{self, luminance};
use ascii_folio::{
    AlphaPolicy, BlockSampler, ColorMode, GlyphRamp, Orientation, RasterFrame, SamplerOptions,
};

fn solid(width: u32, height: u32, rgba: [u8; 4]) -> RasterFrame {
    let data = rgba.iter().copied().cycle().take((width * height * 4) as usize).collect();
    RasterFrame::from_raw(width, height, data).unwrap()
}

fn sampler(cell_size: u32, orientation: Orientation) -> BlockSampler {
    let options = SamplerOptions { cell_size, orientation, ..SamplerOptions::default() };
    BlockSampler::new(GlyphRamp::standard(), options).unwrap()
}

#[test]
fn black_square_normal_is_all_dense() {
    let grid = sampler(8, Orientation::Normal).sample(&solid(16, 16, [0, 0, 0, 255]));
    assert_eq!(grid.to_text(), "@@\n@@");
}

#[test]
fn black_square_inverted_is_all_blank() {
    let grid = sampler(8, Orientation::Inverted).sample(&solid(16, 16, [0, 0, 0, 255]));
    assert_eq!(grid.to_text(), "  \n  ");
}

#[test]
fn uniform_frames_yield_a_single_glyph() {
    let ramp = GlyphRamp::standard();
    for value in [0u8, 37, 128, 200, 254] {
        for orientation in [Orientation::Normal, Orientation::Inverted] {
            let grid = sampler(5, orientation).sample(&solid(23, 17, [value, value, value, 255]));
            let expected = quantize::glyph_for(luminance(value, value, value), &ramp, orientation);
            assert!(grid.cells.iter().all(|cell| cell.ch == expected), "{value} {orientation:?}");
        }
    }
}

#[test]
fn fully_transparent_frames_are_blank_and_colourless() {
    let options = SamplerOptions {
        cell_size: 4,
        alpha: AlphaPolicy::Mask { threshold: 128 },
        color: ColorMode::Source,
        ..SamplerOptions::default()
    };
    let sampler = BlockSampler::new(GlyphRamp::standard(), options).unwrap();
    let grid = sampler.sample(&solid(12, 8, [0, 0, 0, 0]));

    assert_eq!((grid.width, grid.height), (3, 2));
    assert!(grid.cells.iter().all(|cell| cell.ch == ' ' && cell.color.is_none()));
}

#[test]
fn grid_dimensions_round_up() {
    for (width, height, cell) in [(16, 16, 8), (17, 9, 8), (1, 1, 3), (100, 7, 10)] {
        let grid = sampler(cell, Orientation::Normal).sample(&solid(width, height, [9, 9, 9, 255]));
        assert_eq!(grid.width, width.div_ceil(cell) as usize);
        assert_eq!(grid.height, height.div_ceil(cell) as usize);
    }
}

#[test]
fn vertical_decimation_halves_the_rows() {
    let options = SamplerOptions {
        cell_size: 1,
        vertical_decimation: true,
        downsample: 0.5,
        ..SamplerOptions::default()
    };
    let sampler = BlockSampler::new(GlyphRamp::standard(), options).unwrap();
    let grid = sampler.sample(&solid(128, 128, [255, 0, 0, 255]));
    assert_eq!((grid.width, grid.height), (64, 32));
}

#[test]
fn empty_frames_give_empty_grids() {
    let grid = sampler(8, Orientation::Normal).sample(&RasterFrame::new(0, 0));
    assert!(grid.is_empty());
    assert_eq!(grid.to_text(), "");
}
