//! Declarative texture trees
//!
//! [`ScalarSpec`], [`VectorSpec`] and [`ColorSpec`] name every buildable
//! node by a `"type"` tag and carry its parameters, so a whole tree can be
//! written to and read from JSON. `build()` turns a description into boxed
//! fields and reports any parameter the node constructors reject.
//!
//! ```ignore
//! let spec: TextureSpec = serde_json::from_str(&json)?;
//! let root = spec.root.build()?;
//! let pixels = render_rgba(&spec.render, &root)?;
//! ```

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::Cache;
use crate::color::{Color, ColorLerp, Frgba};
use crate::color_field::{
    ColorBlend, ColorConv, ColorFields, ColorGray, ColorNl, ColorSinCos, ColorSubstitute,
    ColorVector, SinCosMode,
};
use crate::combine::{
    BinaryOp, Combiner2, Combiner3, JitterBlend, ShapeCombiner, ShapeField, ShapeStyle,
    StochasticBlend, TernaryOp,
};
use crate::displace::{Displace, DisplaceVector, Distort};
use crate::error::Result;
use crate::field::{
    BoxField, BoxedColor, BoxedScalar, BoxedVector, Rect, Uniform, UniformColor, UniformVector,
    Window,
};
use crate::filter::{Filter, FilterChain, FilterOp};
use crate::fractal::{Fractal, Ifs, IfsCombiner, OctaveCombiner, VariableFractal};
use crate::generator::{GenFunc, Generator, Multi};
use crate::geometry::{Aff3, Circle, Polygon, Shape};
use crate::gradient::{ConicGradient, LinearGradient, RadialGradient};
use crate::morphology::{Convolution, Kernel, MorphOp, Morphology, Support};
use crate::nonlinear::NonLinear;
use crate::noise::{Binary, BlinnField, BlockNoise, Perlin, WorleyField};
use crate::realize::RenderConfig;
use crate::surface::{
    Ambient, DefaultMaterial, Directional, FieldMaterial, LightSource, Material, MaterialSample,
    Surface, UniformMaterial,
};
use crate::tiling::{Hexagons, Squares, StochasticTiler, Tiler, Triangles};
use crate::transform::{Kaleidoscope, Pixelate, Reflect, Strip, Transform, Warp, WarpFunc};
use crate::vector::{
    Channel, ColorSelect, ColorToGray, Direction, Magnitude, Normal, Select, UnitVector,
    VectorColor, VectorCombine, VectorFields, Weighted,
};
use crate::wave::{AcWave, BoxedWave, DcWave, InvertWave, NlWave, PatternWave};

/// A whole document: how to render and what.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureSpec {
    #[serde(default)]
    pub render: RenderConfig,
    pub root: ColorSpec,
}

impl TextureSpec {
    pub fn build(&self) -> Result<BoxedColor> {
        self.render.validate()?;
        debug!(width = self.render.width, height = self.render.height, "Building texture tree");
        self.root.build()
    }
}

/// One dimensional wave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WaveSpec {
    Nl(NlWave),
    Dc(DcWave),
    Ac(AcWave),
    Pattern(PatternWave),
    Invert { wave: Box<WaveSpec> },
}

impl WaveSpec {
    pub fn build(&self) -> Result<BoxedWave> {
        Ok(match self {
            Self::Nl(w) => Box::new(w.clone()),
            Self::Dc(w) => Box::new(w.clone()),
            Self::Ac(w) => Box::new(w.clone()),
            Self::Pattern(w) => Box::new(w.clone()),
            Self::Invert { wave } => Box::new(InvertWave::new(wave.build()?)),
        })
    }
}

/// Region test for the shape nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ShapeSpec {
    Polygon(Polygon),
    Circle(Circle),
}

impl Shape for ShapeSpec {
    fn contains(&self, x: f64, y: f64) -> bool {
        match self {
            Self::Polygon(p) => p.contains(x, y),
            Self::Circle(c) => c.contains(x, y),
        }
    }
}

fn default_one() -> f64 {
    1.0
}

fn default_center() -> f64 {
    0.5
}

/// Scalar field node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScalarSpec {
    Uniform {
        value: f64,
    },
    BoxField {
        rect: Rect,
        inside: f64,
        outside: f64,
    },
    Window {
        src: Box<ScalarSpec>,
        rect: Rect,
        #[serde(default)]
        outside: f64,
    },
    Perlin {
        seed: u64,
    },
    Binary {
        width: usize,
        height: usize,
        seed: u64,
        perc: f64,
    },
    Blocks {
        width: f64,
        height: f64,
        rows: usize,
        cols: usize,
        density: f64,
        seed: u64,
    },
    Worley(WorleyField),
    Blinn(BlinnField),
    LinearGradient {
        wave: WaveSpec,
    },
    RadialGradient {
        wave: WaveSpec,
    },
    ConicGradient {
        wave: WaveSpec,
    },
    Generator {
        lambda: f64,
        #[serde(default)]
        theta: f64,
        func: GenFunc,
        #[serde(default = "default_center")]
        center: f64,
        #[serde(default)]
        phase: f64,
        #[serde(default)]
        filter: Option<FilterOp>,
    },
    Multi {
        lambdas: Vec<f64>,
        #[serde(default)]
        theta: f64,
        func: GenFunc,
        #[serde(default)]
        filter: Option<FilterOp>,
    },
    Squares {
        scale: f64,
    },
    Triangles {
        scale: f64,
    },
    Hexagons {
        scale: f64,
    },
    Transform {
        src: Box<ScalarSpec>,
        xfm: Aff3,
    },
    Pixelate {
        src: Box<ScalarSpec>,
        resolution: f64,
    },
    Strip {
        src: Box<ScalarSpec>,
        value: f64,
    },
    Reflect {
        src: Box<ScalarSpec>,
        start: [f64; 2],
        end: [f64; 2],
    },
    Kaleidoscope {
        src: Box<ScalarSpec>,
        center: [f64; 2],
        n: usize,
        #[serde(default)]
        offset: f64,
        /// Distance of the rim mirrors from the center, none when absent
        #[serde(default)]
        rim: Option<f64>,
    },
    Warp {
        src: Box<ScalarSpec>,
        func: WarpFunc,
    },
    Tiler {
        src: Box<ScalarSpec>,
        domain: [f64; 2],
    },
    StochasticTiler {
        srcs: Vec<ScalarSpec>,
        domain: [f64; 2],
        seed: u64,
    },
    Filter {
        src: Box<ScalarSpec>,
        ops: Vec<FilterOp>,
    },
    Combine {
        a: Box<ScalarSpec>,
        b: Box<ScalarSpec>,
        op: BinaryOp,
        #[serde(default)]
        filter: Option<FilterOp>,
    },
    Combine3 {
        a: Box<ScalarSpec>,
        b: Box<ScalarSpec>,
        c: Box<ScalarSpec>,
        op: TernaryOp,
        #[serde(default)]
        filter: Option<FilterOp>,
    },
    StochasticBlend {
        a: Box<ScalarSpec>,
        b: Box<ScalarSpec>,
        c: Box<ScalarSpec>,
    },
    JitterBlend {
        a: Box<ScalarSpec>,
        b: Box<ScalarSpec>,
        c: Box<ScalarSpec>,
        jitter: f64,
    },
    ShapeCombiner {
        inside: Box<ScalarSpec>,
        outside: Box<ScalarSpec>,
        shape: ShapeSpec,
    },
    Shapes {
        shapes: Vec<ShapeSpec>,
        #[serde(default)]
        style: ShapeStyle,
    },
    Morphology {
        src: Box<ScalarSpec>,
        support: Support,
        op: MorphOp,
    },
    Convolution {
        src: Box<ScalarSpec>,
        kernel: Kernel,
    },
    Displace {
        src: Box<ScalarSpec>,
        dx: Box<ScalarSpec>,
        dy: Box<ScalarSpec>,
        scale: [f64; 2],
        #[serde(default)]
        offset: [f64; 2],
        #[serde(default)]
        independent: bool,
    },
    DisplaceVector {
        src: Box<ScalarSpec>,
        disp: Box<VectorSpec>,
        /// Components driving x and y, and the vector length
        #[serde(default)]
        select: Option<[usize; 3]>,
        scale: f64,
        #[serde(default)]
        offset: [f64; 2],
        #[serde(default)]
        independent: bool,
    },
    Distort {
        src: Box<ScalarSpec>,
        distortion: f64,
    },
    Fractal {
        src: Box<ScalarSpec>,
        xfm: Aff3,
        combiner: OctaveCombiner,
        octaves: f64,
        #[serde(default)]
        filter: Option<FilterOp>,
    },
    VariableFractal {
        src: Box<ScalarSpec>,
        xfm: Aff3,
        combiner: OctaveCombiner,
        octaves: Box<ScalarSpec>,
        max_octaves: f64,
    },
    Ifs {
        domain: [f64; 2],
        xfms: Vec<Aff3>,
        iterations: usize,
    },
    IfsCombiner {
        inside: Box<ScalarSpec>,
        outside: Box<ScalarSpec>,
        domain: [f64; 2],
        xfms: Vec<Aff3>,
        iterations: usize,
    },
    Cache {
        src: Box<ScalarSpec>,
        resolution: f64,
        limit: usize,
    },
    Direction {
        src: Box<VectorSpec>,
    },
    Magnitude {
        src: Box<VectorSpec>,
        #[serde(default = "default_one")]
        scale: f64,
    },
    Select {
        src: Box<VectorSpec>,
        channel: usize,
        #[serde(default = "default_one")]
        scale: f64,
    },
    Weighted {
        src: Box<VectorSpec>,
        weights: Vec<f64>,
    },
    VectorCombine {
        src: Box<VectorSpec>,
        op: TernaryOp,
    },
    ColorToGray {
        src: Box<ColorSpec>,
    },
    ColorSelect {
        src: Box<ColorSpec>,
        channel: Channel,
    },
}

impl ScalarSpec {
    pub fn build(&self) -> Result<BoxedScalar> {
        Ok(match self {
            Self::Uniform { value } => Box::new(Uniform::new(*value)),
            Self::BoxField { rect, inside, outside } => {
                Box::new(BoxField::new(*rect, *inside, *outside))
            }
            Self::Window { src, rect, outside } => {
                Box::new(Window::new(src.build()?, *rect, *outside))
            }
            Self::Perlin { seed } => Box::new(Perlin::new(*seed)),
            Self::Binary {
                width,
                height,
                seed,
                perc,
            } => Box::new(Binary::new(*width, *height, *seed, *perc)?),
            Self::Blocks {
                width,
                height,
                rows,
                cols,
                density,
                seed,
            } => Box::new(BlockNoise::new(*width, *height, *rows, *cols, *density, *seed)?),
            Self::Worley(w) => Box::new(w.clone()),
            Self::Blinn(b) => Box::new(b.clone()),
            Self::LinearGradient { wave } => Box::new(LinearGradient::new(wave.build()?)),
            Self::RadialGradient { wave } => Box::new(RadialGradient::new(wave.build()?)),
            Self::ConicGradient { wave } => Box::new(ConicGradient::new(wave.build()?)),
            Self::Generator {
                lambda,
                theta,
                func,
                center,
                phase,
                filter,
            } => {
                let mut g = Generator::new(*lambda, *theta, func.clone())
                    .with_center(*center)
                    .with_phase(*phase);
                if let Some(f) = filter {
                    g = g.with_filter(f.clone());
                }
                Box::new(g)
            }
            Self::Multi {
                lambdas,
                theta,
                func,
                filter,
            } => {
                let mut m = Multi::new(lambdas.clone(), *theta, func.clone())?;
                if let Some(f) = filter {
                    m = m.with_filter(f.clone());
                }
                Box::new(m)
            }
            Self::Squares { scale } => Box::new(Squares::new(*scale)?),
            Self::Triangles { scale } => Box::new(Triangles::new(*scale)?),
            Self::Hexagons { scale } => Box::new(Hexagons::new(*scale)?),
            Self::Transform { src, xfm } => Box::new(Transform::new(src.build()?, *xfm)),
            Self::Pixelate { src, resolution } => {
                Box::new(Pixelate::new(src.build()?, *resolution)?)
            }
            Self::Strip { src, value } => Box::new(Strip::new(src.build()?, *value)),
            Self::Reflect { src, start, end } => Box::new(Reflect::new(src.build()?, *start, *end)),
            Self::Kaleidoscope {
                src,
                center,
                n,
                offset,
                rim,
            } => match rim {
                Some(d) => Box::new(Kaleidoscope::with_rim(src.build()?, *center, *d, *n, *offset)),
                None => Box::new(Kaleidoscope::new(src.build()?, *center, *n, *offset)),
            },
            Self::Warp { src, func } => Box::new(Warp::new(src.build()?, func.clone())),
            Self::Tiler { src, domain } => Box::new(Tiler::new(src.build()?, *domain)?),
            Self::StochasticTiler { srcs, domain, seed } => {
                let srcs = srcs.iter().map(Self::build).collect::<Result<Vec<_>>>()?;
                Box::new(StochasticTiler::new(srcs, *domain, *seed)?)
            }
            Self::Filter { src, ops } => {
                Box::new(Filter::chain(src.build()?, FilterChain::new(ops.clone())))
            }
            Self::Combine { a, b, op, filter } => {
                let mut c = Combiner2::new(a.build()?, b.build()?, *op);
                if let Some(f) = filter {
                    c = c.with_filter(f.clone());
                }
                Box::new(c)
            }
            Self::Combine3 { a, b, c, op, filter } => {
                let mut t = Combiner3::new(a.build()?, b.build()?, c.build()?, *op);
                if let Some(f) = filter {
                    t = t.with_filter(f.clone());
                }
                Box::new(t)
            }
            Self::StochasticBlend { a, b, c } => {
                Box::new(StochasticBlend::new(a.build()?, b.build()?, c.build()?))
            }
            Self::JitterBlend { a, b, c, jitter } => {
                Box::new(JitterBlend::new(a.build()?, b.build()?, c.build()?, *jitter))
            }
            Self::ShapeCombiner { inside, outside, shape } => {
                Box::new(ShapeCombiner::new(inside.build()?, outside.build()?, shape.clone()))
            }
            Self::Shapes { shapes, style } => Box::new(ShapeField::new(shapes.clone(), *style)),
            Self::Morphology { src, support, op } => {
                Box::new(Morphology::new(src.build()?, support.clone(), *op))
            }
            Self::Convolution { src, kernel } => {
                Box::new(Convolution::new(src.build()?, kernel.clone()))
            }
            Self::Displace {
                src,
                dx,
                dy,
                scale,
                offset,
                independent,
            } => Box::new(
                Displace::new(src.build()?, dx.build()?, dy.build()?, 1.0)
                    .with_scale(scale[0], scale[1])
                    .with_offset(*offset)
                    .independent(*independent),
            ),
            Self::DisplaceVector {
                src,
                disp,
                select,
                scale,
                offset,
                independent,
            } => {
                let mut d = DisplaceVector::new(src.build()?, disp.build()?, *scale)
                    .with_offset(*offset)
                    .independent(*independent);
                if let Some([sx, sy, len]) = select {
                    d = d.with_select(*sx, *sy, *len)?;
                }
                Box::new(d)
            }
            Self::Distort { src, distortion } => Box::new(Distort::new(src.build()?, *distortion)),
            Self::Fractal {
                src,
                xfm,
                combiner,
                octaves,
                filter,
            } => {
                let mut f = Fractal::new(src.build()?, *xfm, *combiner, *octaves);
                if let Some(op) = filter {
                    f = f.with_filter(op.clone());
                }
                Box::new(f)
            }
            Self::VariableFractal {
                src,
                xfm,
                combiner,
                octaves,
                max_octaves,
            } => Box::new(VariableFractal::new(
                src.build()?,
                *xfm,
                *combiner,
                octaves.build()?,
                *max_octaves,
            )),
            Self::Ifs {
                domain,
                xfms,
                iterations,
            } => Box::new(Ifs::new(*domain, xfms, *iterations)?),
            Self::IfsCombiner {
                inside,
                outside,
                domain,
                xfms,
                iterations,
            } => Box::new(IfsCombiner::new(
                inside.build()?,
                outside.build()?,
                Ifs::new(*domain, xfms, *iterations)?,
            )),
            Self::Cache { src, resolution, limit } => {
                Box::new(Cache::new(src.build()?, *resolution, *limit)?)
            }
            Self::Direction { src } => Box::new(Direction::new(src.build()?)),
            Self::Magnitude { src, scale } => Box::new(Magnitude::new(src.build()?, *scale)),
            Self::Select { src, channel, scale } => {
                Box::new(Select::new(src.build()?, *channel, *scale))
            }
            Self::Weighted { src, weights } => {
                Box::new(Weighted::new(src.build()?, weights.clone()))
            }
            Self::VectorCombine { src, op } => Box::new(VectorCombine::new(src.build()?, *op)),
            Self::ColorToGray { src } => Box::new(ColorToGray::new(src.build()?)),
            Self::ColorSelect { src, channel } => {
                Box::new(ColorSelect::new(src.build()?, *channel))
            }
        })
    }
}

/// Vector field node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VectorSpec {
    Uniform {
        value: Vec<f64>,
    },
    Fields {
        srcs: Vec<ScalarSpec>,
    },
    Color {
        src: Box<ColorSpec>,
    },
    Normal {
        src: Box<ScalarSpec>,
        #[serde(default = "default_one")]
        sx: f64,
        #[serde(default = "default_one")]
        sy: f64,
        #[serde(default = "default_one")]
        dx: f64,
        #[serde(default = "default_one")]
        dy: f64,
    },
    Unit {
        src: Box<VectorSpec>,
    },
    Transform {
        src: Box<VectorSpec>,
        xfm: Aff3,
    },
    Tiler {
        src: Box<VectorSpec>,
        domain: [f64; 2],
    },
}

impl VectorSpec {
    pub fn build(&self) -> Result<BoxedVector> {
        Ok(match self {
            Self::Uniform { value } => Box::new(UniformVector::new(value.clone())),
            Self::Fields { srcs } => {
                let srcs = srcs.iter().map(ScalarSpec::build).collect::<Result<Vec<_>>>()?;
                Box::new(VectorFields::new(srcs)?)
            }
            Self::Color { src } => Box::new(VectorColor::new(src.build()?)),
            Self::Normal { src, sx, sy, dx, dy } => {
                Box::new(Normal::new(src.build()?, *sx, *sy, *dx, *dy)?)
            }
            Self::Unit { src } => Box::new(UnitVector::new(src.build()?)),
            Self::Transform { src, xfm } => Box::new(Transform::new(src.build()?, *xfm)),
            Self::Tiler { src, domain } => Box::new(Tiler::new(src.build()?, *domain)?),
        })
    }
}

/// Material of a lit surface.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MaterialSpec {
    #[default]
    Default,
    Uniform(MaterialSample),
    Field {
        color: Box<ColorSpec>,
        #[serde(default)]
        specular: Option<Frgba>,
        #[serde(default)]
        shininess: f64,
        #[serde(default)]
        roughness: f64,
    },
}

impl MaterialSpec {
    pub fn build(&self) -> Result<Box<dyn Material>> {
        Ok(match self {
            Self::Default => Box::new(DefaultMaterial),
            Self::Uniform(sample) => Box::new(UniformMaterial::new(*sample)),
            Self::Field {
                color,
                specular,
                shininess,
                roughness,
            } => Box::new(
                FieldMaterial::new(color.build()?)
                    .with_specular(specular.unwrap_or(Frgba::BLACK), *shininess)
                    .with_roughness(*roughness),
            ),
        })
    }
}

/// Color field node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColorSpec {
    Uniform {
        color: Color,
    },
    Gray {
        src: Box<ScalarSpec>,
    },
    Fields {
        srcs: [Box<ScalarSpec>; 3],
        #[serde(default)]
        alpha: Option<Box<ScalarSpec>>,
        #[serde(default)]
        hsl: bool,
    },
    Vector {
        src: Box<VectorSpec>,
    },
    Conv {
        src: Box<ScalarSpec>,
        ramp: ColorNl,
    },
    Blend {
        a: Box<ColorSpec>,
        b: Box<ColorSpec>,
        t: Box<ScalarSpec>,
        #[serde(default)]
        lerp: ColorLerp,
    },
    Substitute {
        a: Box<ColorSpec>,
        b: Box<ColorSpec>,
        t: Box<ScalarSpec>,
        start: f64,
        end: f64,
    },
    SinCos {
        src: Box<ScalarSpec>,
        #[serde(default)]
        mode: SinCosMode,
        #[serde(default)]
        hsl: bool,
    },
    Surface {
        #[serde(default)]
        material: MaterialSpec,
        /// Flat when absent
        #[serde(default)]
        normals: Option<Box<VectorSpec>>,
        #[serde(default)]
        ambient: Option<Ambient>,
        #[serde(default)]
        lights: Vec<LightSource>,
        #[serde(default)]
        blinn: bool,
    },
    Transform {
        src: Box<ColorSpec>,
        xfm: Aff3,
    },
    Reflect {
        src: Box<ColorSpec>,
        start: [f64; 2],
        end: [f64; 2],
    },
    Tiler {
        src: Box<ColorSpec>,
        domain: [f64; 2],
    },
    Warp {
        src: Box<ColorSpec>,
        func: WarpFunc,
    },
    ShapeCombiner {
        inside: Box<ColorSpec>,
        outside: Box<ColorSpec>,
        shape: ShapeSpec,
    },
}

impl ColorSpec {
    pub fn build(&self) -> Result<BoxedColor> {
        Ok(match self {
            Self::Uniform { color } => Box::new(UniformColor::new(*color)),
            Self::Gray { src } => Box::new(ColorGray::new(src.build()?)),
            Self::Fields { srcs, alpha, hsl } => {
                let [a, b, c] = srcs;
                let alpha = alpha.as_deref().map(ScalarSpec::build).transpose()?;
                Box::new(ColorFields::new([a.build()?, b.build()?, c.build()?], alpha, *hsl))
            }
            Self::Vector { src } => Box::new(ColorVector::new(src.build()?)),
            Self::Conv { src, ramp } => Box::new(ColorConv::new(src.build()?, ramp.clone())),
            Self::Blend { a, b, t, lerp } => {
                Box::new(ColorBlend::new(a.build()?, b.build()?, t.build()?, *lerp))
            }
            Self::Substitute { a, b, t, start, end } => {
                Box::new(ColorSubstitute::new(a.build()?, b.build()?, t.build()?, *start, *end))
            }
            Self::SinCos { src, mode, hsl } => {
                Box::new(ColorSinCos::new(src.build()?, *mode, *hsl))
            }
            Self::Surface {
                material,
                normals,
                ambient,
                lights,
                blinn,
            } => {
                let normals: BoxedVector = match normals {
                    Some(n) => n.build()?,
                    None => Box::new(UniformVector::default_normal()),
                };
                let mut s = Surface::new(material.build()?, normals).blinn(*blinn);
                if let Some(a) = ambient {
                    s = s.with_ambient(*a);
                }
                for l in lights {
                    s = s.with_light(*l);
                }
                Box::new(s)
            }
            Self::Transform { src, xfm } => Box::new(Transform::new(src.build()?, *xfm)),
            Self::Reflect { src, start, end } => Box::new(Reflect::new(src.build()?, *start, *end)),
            Self::Tiler { src, domain } => Box::new(Tiler::new(src.build()?, *domain)?),
            Self::Warp { src, func } => Box::new(Warp::new(src.build()?, func.clone())),
            Self::ShapeCombiner { inside, outside, shape } => {
                Box::new(ShapeCombiner::new(inside.build()?, outside.build()?, shape.clone()))
            }
        })
    }
}

/// Built-in sample tree: lit fBm bumps under a color ramp.
pub fn sample() -> TextureSpec {
    let mut xfm = Aff3::scaling(2.0, 2.0);
    xfm.rotate(0.5);
    let height = ScalarSpec::Fractal {
        src: Box::new(ScalarSpec::Transform {
            src: Box::new(ScalarSpec::Perlin { seed: 1 }),
            xfm: Aff3::scaling(1.0 / 64.0, 1.0 / 64.0),
        }),
        xfm,
        combiner: OctaveCombiner::Fbm {
            hurst: 0.8,
            lacunarity: 2.0,
        },
        octaves: 5.5,
        filter: None,
    };
    let ramp = ColorNl::simple(
        Color::rgba(0.1, 0.2, 0.5, 1.0),
        Color::rgba(0.95, 0.85, 0.6, 1.0),
        NonLinear::P3,
        ColorLerp::HslShortest,
    );
    TextureSpec {
        render: RenderConfig::default(),
        root: ColorSpec::Surface {
            material: MaterialSpec::Field {
                color: Box::new(ColorSpec::Conv {
                    src: Box::new(height.clone()),
                    ramp,
                }),
                specular: Some(Frgba::new(0.3, 0.3, 0.3, 1.0)),
                shininess: 20.0,
                roughness: 0.0,
            },
            normals: Some(Box::new(VectorSpec::Normal {
                src: Box::new(height),
                sx: 8.0,
                sy: 8.0,
                dx: 1.0,
                dy: 1.0,
            })),
            ambient: Some(Ambient::new(Frgba::new(0.15, 0.15, 0.15, 1.0))),
            lights: vec![LightSource::Directional(Directional::new(
                Frgba::WHITE,
                Vector3::new(-1.0, -1.0, 1.0),
            ))],
            blinn: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{ColorField, ScalarField};

    #[test]
    fn test_scalar_json_builds() {
        let json = r#"{
            "type": "combine",
            "a": {"type": "squares", "scale": 10},
            "b": {"type": "uniform", "value": 0.5},
            "op": {"op": "min"}
        }"#;
        let spec: ScalarSpec = serde_json::from_str(json).unwrap();
        let f = spec.build().unwrap();
        assert_eq!(f.eval(1.0, 1.0), 0.5);
        assert_eq!(f.eval(11.0, 1.0), -1.0);
    }

    #[test]
    fn test_build_surfaces_constructor_errors() {
        let bad = ScalarSpec::Squares { scale: 0.0 };
        assert!(bad.build().is_err());
        let nested = ColorSpec::Gray {
            src: Box::new(ScalarSpec::Ifs {
                domain: [1.0, 1.0],
                xfms: vec![],
                iterations: 2,
            }),
        };
        assert!(nested.build().is_err());
        assert!(serde_json::from_str::<ScalarSpec>(r#"{"type": "teapot"}"#).is_err());
    }

    #[test]
    fn test_sample_round_trip_and_builds() {
        let spec = sample();
        let json = serde_json::to_string_pretty(&spec).unwrap();
        let back: TextureSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spec);
        let root = back.build().unwrap();
        let c = ColorField::eval(&root, 10.0, 20.0).to_rgba();
        assert!((0.0..=1.0).contains(&c.r));
    }
}
