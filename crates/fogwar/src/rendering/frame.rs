use super::pool::FogTileBackend;
use super::viewport::ViewportBounds;

pub const DEFAULT_FOG_COLOR: [u8; 4] = [0, 0, 0, 255];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTile {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTileId(usize);

/// Software backend: keeps fog quads in a slot table and rasterizes them into an RGBA buffer.
#[derive(Debug, Clone)]
pub struct FrameBackend {
    tiles: Vec<Option<FrameTile>>,
    free_slots: Vec<usize>,
    fog_color: [u8; 4],
    created: u64,
    destroyed: u64,
}

impl Default for FrameBackend {
    fn default() -> Self {
        Self::new(DEFAULT_FOG_COLOR)
    }
}

impl FrameBackend {
    pub fn new(fog_color: [u8; 4]) -> Self {
        Self {
            tiles: Vec::new(),
            free_slots: Vec::new(),
            fog_color,
            created: 0,
            destroyed: 0,
        }
    }

    pub fn fog_color(&self) -> [u8; 4] {
        self.fog_color
    }

    pub fn created(&self) -> u64 {
        self.created
    }

    pub fn destroyed(&self) -> u64 {
        self.destroyed
    }

    pub fn live_tiles(&self) -> usize {
        self.tiles.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn visible_tiles(&self) -> impl Iterator<Item = &FrameTile> {
        self.tiles.iter().flatten().filter(|tile| tile.visible)
    }

    /// Draws every visible fog tile that overlaps `view`; returns how many were drawn.
    pub fn rasterize(&self, frame: &mut [u8], width: u32, height: u32, view: ViewportBounds) -> usize {
        if width == 0 || height == 0 || !view.is_valid() {
            return 0;
        }
        let view_w = view.width();
        let view_h = view.height();
        if view_w <= 0.0 || view_h <= 0.0 {
            return 0;
        }
        let scale_x = width as f32 / view_w;
        let scale_y = height as f32 / view_h;
        let width_px = pixel_extent(width);
        let height_px = pixel_extent(height);

        let mut drawn = 0usize;
        for tile in self.visible_tiles() {
            let x0 = ((tile.x - view.left) * scale_x).floor() as i32;
            let x1 = ((tile.x + tile.size - view.left) * scale_x).ceil() as i32;
            let y0 = ((tile.y - view.top) * scale_y).floor() as i32;
            let y1 = ((tile.y + tile.size - view.top) * scale_y).ceil() as i32;
            if x1 <= 0 || y1 <= 0 || x0 >= width_px || y0 >= height_px {
                continue;
            }
            fill_rect(frame, width, height, x0, y0, x1, y1, self.fog_color);
            drawn += 1;
        }
        drawn
    }

    fn slot_mut(&mut self, handle: &FrameTileId) -> Option<&mut FrameTile> {
        self.tiles.get_mut(handle.0).and_then(Option::as_mut)
    }
}

impl FogTileBackend for FrameBackend {
    type Handle = FrameTileId;

    fn create_tile(&mut self, size: f32) -> FrameTileId {
        let tile = FrameTile {
            x: 0.0,
            y: 0.0,
            size,
            visible: false,
        };
        self.created = self.created.saturating_add(1);
        match self.free_slots.pop() {
            Some(index) => {
                self.tiles[index] = Some(tile);
                FrameTileId(index)
            }
            None => {
                self.tiles.push(Some(tile));
                FrameTileId(self.tiles.len() - 1)
            }
        }
    }

    fn place_tile(&mut self, handle: &mut FrameTileId, x: f32, y: f32) {
        if let Some(tile) = self.slot_mut(handle) {
            tile.x = x;
            tile.y = y;
        }
    }

    fn set_tile_visible(&mut self, handle: &mut FrameTileId, visible: bool) {
        if let Some(tile) = self.slot_mut(handle) {
            tile.visible = visible;
        }
    }

    fn destroy_tile(&mut self, handle: FrameTileId) {
        if let Some(slot) = self.tiles.get_mut(handle.0) {
            if slot.take().is_some() {
                self.free_slots.push(handle.0);
                self.destroyed = self.destroyed.saturating_add(1);
            }
        }
    }
}

pub fn clear_frame(frame: &mut [u8], color: [u8; 4]) {
    for pixel in frame.chunks_exact_mut(4) {
        pixel.copy_from_slice(&color);
    }
}

/// Fills the half-open pixel rect `[x0, x1) x [y0, y1)`, clipped to the frame.
#[allow(clippy::too_many_arguments)]
fn fill_rect(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    color: [u8; 4],
) {
    let rows_in_frame = (frame.len() / 4)
        .checked_div(width as usize)
        .unwrap_or(0);
    let x_start = x0.max(0);
    let y_start = y0.max(0);
    let x_end = x1.min(pixel_extent(width));
    let y_end = y1
        .min(pixel_extent(height))
        .min(i32::try_from(rows_in_frame).unwrap_or(i32::MAX));
    for y in y_start..y_end {
        for x in x_start..x_end {
            write_pixel_rgba_clipped(frame, width as usize, x, y, color);
        }
    }
}

fn pixel_extent(size: u32) -> i32 {
    i32::try_from(size).unwrap_or(i32::MAX)
}

fn write_pixel_rgba_clipped(frame: &mut [u8], width: usize, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 {
        return;
    }
    let x = x as usize;
    let y = y as usize;
    let Some(pixel_offset) = y.checked_mul(width).and_then(|row| row.checked_add(x)) else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(end) = byte_offset.checked_add(4) else {
        return;
    };
    if end > frame.len() {
        return;
    }
    frame[byte_offset..end].copy_from_slice(&color);
}
