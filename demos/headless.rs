//! # Headless Brain Demo
//!
//! Demonstrates:
//! - Building a two-hemisphere mesh and uploading it to a brain visual
//! - Scalar coloring through a named colormap
//! - Hemisphere switching and translucency
//! - Orbiting a camera the light is coupled to
//!
//! Runs without a window. With `--backend wgpu` the frames are rendered into
//! an offscreen texture; with the dummy backend the recorded draw calls are
//! logged instead.
//!
//! ```bash
//! cargo run --example headless -- --backend wgpu --frames 8 --hemisphere left
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use clap::{Parser, ValueEnum};

use brain_visual::backend::{
    ColorAttachment, DepthStencilAttachment, GraphicsBackend, LoadOp, RenderPassDescriptor,
    StoreOp, TextureViewHandle,
};
use brain_visual::scene::OrbitController;
use brain_visual::{
    BrainVisual, BrainVisualConfig, Camera, ColorData, ColorMap, ColorSpec, DummyBackend,
    Hemisphere, MeshGeometry, ScalarColormap, SharedCamera, Visual, VisualResult, WgpuBackend,
};

const SIZE: u32 = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BackendChoice {
    Dummy,
    Wgpu,
}

/// Render a synthetic brain mesh without a window
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Graphics backend
    #[arg(long, value_enum, default_value = "dummy")]
    backend: BackendChoice,

    /// Number of frames to render
    #[arg(long, default_value_t = 4)]
    frames: u32,

    /// Hemisphere to draw: both, left or right
    #[arg(long, default_value = "both")]
    hemisphere: Hemisphere,

    /// Draw translucent, without depth testing
    #[arg(long)]
    translucent: bool,

    /// Global alpha, clamped by the translucency mode
    #[arg(long, default_value_t = 1.0)]
    alpha: f32,

    /// Colormap for the scalar field: viridis, gray, hot or coolwarm
    #[arg(long, default_value = "viridis")]
    colormap: String,

    /// Degrees the camera orbits per frame
    #[arg(long, default_value_t = 15.0)]
    orbit_step: f32,
}

/// Offscreen color and depth targets of the wgpu run
struct Targets {
    color: TextureViewHandle,
    depth: TextureViewHandle,
}

impl Targets {
    fn new(backend: &mut WgpuBackend) -> Self {
        let texture = |backend: &WgpuBackend, label, format| {
            backend.device().create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: SIZE,
                    height: SIZE,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
        };
        let color = texture(backend, "Offscreen color", wgpu::TextureFormat::Bgra8UnormSrgb);
        let depth = texture(backend, "Offscreen depth", wgpu::TextureFormat::Depth32Float);
        Self {
            color: backend.register_texture_view(color.create_view(&Default::default())),
            depth: backend.register_texture_view(depth.create_view(&Default::default())),
        }
    }

    fn pass(&self) -> RenderPassDescriptor {
        RenderPassDescriptor {
            label: Some("Brain pass".into()),
            color_attachments: vec![ColorAttachment {
                view: self.color,
                load_op: LoadOp::Clear([0.05, 0.05, 0.08, 1.0]),
                store_op: StoreOp::Store,
            }],
            depth_stencil_attachment: Some(DepthStencilAttachment {
                view: self.depth,
                depth_load_op: LoadOp::Clear([1.0; 4]),
                depth_store_op: StoreOp::Discard,
                depth_clear_value: 1.0,
            }),
        }
    }
}

/// Backend plus whatever it needs to present a frame
enum Host {
    Dummy(DummyBackend),
    Wgpu(Box<WgpuBackend>, Targets),
}

impl Host {
    fn new(choice: BackendChoice) -> Option<Self> {
        match choice {
            BackendChoice::Dummy => Some(Host::Dummy(DummyBackend::new())),
            BackendChoice::Wgpu => match WgpuBackend::new_headless() {
                Ok(mut backend) => {
                    let targets = Targets::new(&mut backend);
                    Some(Host::Wgpu(Box::new(backend), targets))
                }
                Err(err) => {
                    log::error!("wgpu is not available: {}", err);
                    None
                }
            },
        }
    }

    fn backend(&mut self) -> &mut dyn GraphicsBackend {
        match self {
            Host::Dummy(backend) => backend,
            Host::Wgpu(backend, _) => &mut **backend,
        }
    }

    fn render(&mut self, visual: &mut BrainVisual) -> VisualResult<()> {
        match self {
            Host::Dummy(backend) => {
                backend.begin_render_pass(&RenderPassDescriptor {
                    label: Some("Brain pass".into()),
                    color_attachments: vec![],
                    depth_stencil_attachment: None,
                });
                visual.draw(backend)?;
                backend.end_render_pass();
                for command in backend.take_commands() {
                    log::debug!("{:?}", command);
                }
            }
            Host::Wgpu(backend, targets) => {
                backend.begin_frame();
                backend.begin_render_pass(&targets.pass());
                visual.draw(&mut **backend)?;
                backend.end_render_pass();
                backend.submit();
            }
        }
        Ok(())
    }
}

fn build_visual(backend: &mut dyn GraphicsBackend, args: &Args) -> VisualResult<BrainVisual> {
    let geometry = MeshGeometry::hemisphere_pair(60.0, 8.0, 48, 24);
    log::info!(
        "Mesh: {} vertices, {} faces",
        geometry.vertex_count(),
        geometry.face_count()
    );

    let config = BrainVisualConfig {
        hemisphere: args.hemisphere,
        ..Default::default()
    };
    let mut visual = BrainVisual::new(backend, geometry, config)?;
    visual.set_translucent(args.translucent)?;
    visual.set_global_alpha(args.alpha)?;

    // Height above the equator as a stand-in for curvature
    let scalars: Vec<f32> = visual.store().vertices().iter().map(|v| v.y).collect();
    let cmap = ScalarColormap::new(ColorMap::by_name(&args.colormap)?);
    visual.set_color(
        backend,
        ColorData::Scalar(&scalars, &cmap),
        &ColorSpec::default(),
        1.0,
    )?;
    Ok(visual)
}

fn run(host: &mut Host, args: &Args) -> VisualResult<()> {
    let mut visual = build_visual(host.backend(), args)?;

    let camera = Rc::new(RefCell::new(Camera::framing(visual.center(), visual.ratio())));
    let shared: SharedCamera = camera.clone();
    visual.bind_camera(Some(&shared));

    let mut orbit = OrbitController::default();
    orbit.sync_with_camera(&camera.borrow());

    for index in 0..args.frames {
        orbit.orbit(args.orbit_step, 0.0);
        orbit.apply(&mut camera.borrow_mut());

        let view_projection = camera.borrow().view_projection_matrix();
        visual.prepare_transforms(host.backend(), view_projection)?;
        visual.prepare_draw(host.backend())?;
        host.render(&mut visual)?;

        log::info!(
            "Frame {}: light at {:?}, {} indices",
            index,
            visual.effective_light_position(),
            visual.store().index_count()
        );
    }

    visual.set_hemisphere(host.backend(), Hemisphere::Both)?;
    log::info!(
        "Bounds: center {:?}, extent {:?}, {} indices with both hemispheres",
        visual.center(),
        visual.ratio(),
        visual.store().index_count()
    );
    visual.release(host.backend());
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    log::info!("Starting headless brain demo with {:?} backend", args.backend);

    let Some(mut host) = Host::new(args.backend) else {
        std::process::exit(1);
    };

    if let Err(err) = run(&mut host, &args) {
        log::error!("Demo failed: {}", err);
        std::process::exit(1);
    }

    if let Host::Dummy(backend) = &host {
        log::info!("Live resources after release: {}", backend.live_resource_count());
    }
}
