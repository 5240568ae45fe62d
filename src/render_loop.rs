//! The serial event queue that owns the GPU context.
//!
//! Surface lifecycle notifications and frame ticks are posted as
//! [`RenderEvent`]s from any number of producers, and handled one at a time,
//! in arrival order, on the thread that owns the [`RenderLoop`]. Because a
//! `SurfaceDestroyed` is handled before anything queued after it, no draw can
//! ever run against a released context.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use crate::assets::AssetSource;
use crate::config::RendererConfig;
use crate::error::RenderError;
use crate::renderer::device::Gpu;
use crate::renderer::FrameRenderer;

pub enum RenderEvent<S> {
    SurfaceAvailable { surface: S, width: u32, height: u32 },
    SurfaceResized { width: u32, height: u32 },
    FrameTick,
    SurfaceDestroyed,
}

impl<S> std::fmt::Debug for RenderEvent<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderEvent::SurfaceAvailable { width, height, .. } => f
                .debug_struct("SurfaceAvailable")
                .field("width", width)
                .field("height", height)
                .finish_non_exhaustive(),
            RenderEvent::SurfaceResized { width, height } => f
                .debug_struct("SurfaceResized")
                .field("width", width)
                .field("height", height)
                .finish(),
            RenderEvent::FrameTick => f.write_str("FrameTick"),
            RenderEvent::SurfaceDestroyed => f.write_str("SurfaceDestroyed"),
        }
    }
}

/// Creates and manages the drawing context for a surface.
pub trait ContextProvider {
    /// Whatever the platform hands over when a surface becomes available.
    type Surface;
    type Device: Gpu;

    /// Creates a context for `surface`, makes it current, and returns the
    /// device to issue GPU calls with.
    fn create_surface(&mut self, surface: Self::Surface) -> Result<Self::Device, RenderError>;
    fn make_current(&mut self) -> Result<(), RenderError>;
    fn swap_buffers(&mut self) -> Result<(), RenderError>;
    fn has_valid_context(&self) -> bool;
    fn release(&mut self);
}

pub struct RenderLoop<C: ContextProvider, A: AssetSource> {
    // Declared before `context` so the GPU resources are dropped while the
    // context still exists.
    renderer: FrameRenderer<C::Device>,
    context: C,
    assets: A,
    receiver: Receiver<RenderEvent<C::Surface>>,
}

impl<C: ContextProvider, A: AssetSource> RenderLoop<C, A> {
    /// Returns the loop and the sender to post events to it with.
    pub fn new(
        context: C,
        assets: A,
        config: RendererConfig,
    ) -> (RenderLoop<C, A>, Sender<RenderEvent<C::Surface>>) {
        let (sender, receiver) = mpsc::channel();
        (
            RenderLoop::with_receiver(context, assets, config, receiver),
            sender,
        )
    }

    pub fn with_receiver(
        context: C,
        assets: A,
        config: RendererConfig,
        receiver: Receiver<RenderEvent<C::Surface>>,
    ) -> RenderLoop<C, A> {
        RenderLoop {
            renderer: FrameRenderer::new(config),
            context,
            assets,
            receiver,
        }
    }

    pub fn renderer(&self) -> &FrameRenderer<C::Device> {
        &self.renderer
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    /// Handles every event that has already been posted, and returns how many
    /// there were.
    pub fn pump(&mut self) -> Result<usize, RenderError> {
        let mut handled = 0;
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    self.handle(event)?;
                    handled += 1;
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return Ok(handled),
            }
        }
    }

    /// Handles events as they arrive, until every sender has been dropped.
    pub fn run(mut self) -> Result<(), RenderError> {
        while let Ok(event) = self.receiver.recv() {
            self.handle(event)?;
        }
        log::debug!("all render event senders are gone, stopping");
        Ok(())
    }

    pub fn handle(&mut self, event: RenderEvent<C::Surface>) -> Result<(), RenderError> {
        log::trace!("handling {event:?}");
        match event {
            RenderEvent::SurfaceAvailable {
                surface,
                width,
                height,
            } => {
                if self.renderer.is_ready() {
                    self.renderer.surface_destroyed();
                }
                let device = self.context.create_surface(surface)?;
                let document = self.assets.read(&self.renderer.config().scene_asset)?;
                self.renderer
                    .surface_available(device, &document, width, height)
            }
            RenderEvent::SurfaceResized { width, height } => {
                if self.renderer.is_ready() && self.context.has_valid_context() {
                    self.context.make_current()?;
                    self.renderer.surface_resized(width, height);
                }
                Ok(())
            }
            RenderEvent::FrameTick => {
                if !self.renderer.is_ready() || !self.context.has_valid_context() {
                    log::trace!("no surface to draw on, skipping frame");
                    return Ok(());
                }
                self.context.make_current()?;
                self.renderer.frame_tick()?;
                self.context.swap_buffers()
            }
            RenderEvent::SurfaceDestroyed => {
                self.renderer.surface_destroyed();
                self.context.release();
                Ok(())
            }
        }
    }
}

/// Starts a dedicated render thread. `setup` runs on the new thread, so the
/// context provider it creates never leaves the thread it is used on.
pub fn spawn<C, A, F>(
    name: &str,
    setup: F,
) -> std::io::Result<(JoinHandle<Result<(), RenderError>>, Sender<RenderEvent<C::Surface>>)>
where
    C: ContextProvider + 'static,
    C::Surface: Send + 'static,
    A: AssetSource + 'static,
    F: FnOnce() -> (C, A, RendererConfig) + Send + 'static,
{
    let (sender, receiver) = mpsc::channel();
    let handle = thread::Builder::new().name(name.to_string()).spawn(move || {
        let (context, assets, config) = setup();
        RenderLoop::with_receiver(context, assets, config, receiver).run()
    })?;
    Ok((handle, sender))
}
