/// Drawing primitives the host provides for fog overlay tiles.
pub trait FogTileBackend {
    type Handle;

    fn create_tile(&mut self, size: f32) -> Self::Handle;
    fn place_tile(&mut self, handle: &mut Self::Handle, x: f32, y: f32);
    fn set_tile_visible(&mut self, handle: &mut Self::Handle, visible: bool);
    fn destroy_tile(&mut self, handle: Self::Handle);
}

/// Free list of hidden tiles plus the list shown this frame.
#[derive(Debug)]
pub struct TilePool<H> {
    free: Vec<H>,
    active: Vec<H>,
    created_total: u64,
}

impl<H> Default for TilePool<H> {
    fn default() -> Self {
        Self {
            free: Vec::new(),
            active: Vec::new(),
            created_total: 0,
        }
    }
}

impl<H> TilePool<H> {
    pub fn release_all<B>(&mut self, backend: &mut B)
    where
        B: FogTileBackend<Handle = H>,
    {
        for mut handle in self.active.drain(..) {
            backend.set_tile_visible(&mut handle, false);
            self.free.push(handle);
        }
    }

    pub fn activate<B>(&mut self, backend: &mut B, size: f32, x: f32, y: f32)
    where
        B: FogTileBackend<Handle = H>,
    {
        let mut handle = match self.free.pop() {
            Some(handle) => handle,
            None => {
                self.created_total = self.created_total.saturating_add(1);
                backend.create_tile(size)
            }
        };
        backend.place_tile(&mut handle, x, y);
        backend.set_tile_visible(&mut handle, true);
        self.active.push(handle);
    }

    pub fn drain_all<B>(&mut self, backend: &mut B)
    where
        B: FogTileBackend<Handle = H>,
    {
        for handle in self.active.drain(..).chain(self.free.drain(..)) {
            backend.destroy_tile(handle);
        }
    }

    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub fn created_total(&self) -> u64 {
        self.created_total
    }
}
