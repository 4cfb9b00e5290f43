//! Properties every texture tree has to keep
//!
//! Range, periodicity, determinism, reflection, cache transparency and
//! morphology ordering, checked over randomized coordinates including
//! negative and large-magnitude ones.

use approx::assert_abs_diff_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use texture_core::combine::{
    BinaryOp, Combiner2, Combiner3, JitterBlend, ShapeCombiner, ShapeField, ShapeStyle, TernaryOp,
};
use texture_core::displace::{Displace, Distort};
use texture_core::filter::{Filter, FilterOp};
use texture_core::fractal::{Ifs, VariableFractal};
use texture_core::generator::{GenFunc, Generator, Multi};
use texture_core::gradient::{ConicGradient, LinearGradient, RadialGradient};
use texture_core::morphology::{Convolution, Kernel, MorphOp, Morphology, Support};
use texture_core::noise::{random_points, BlinnField, BlockNoise, Distance, Falloff, WorleyField};
use texture_core::tiling::{Hexagons, Squares, StochasticTiler, Tiler, Triangles};
use texture_core::transform::{Kaleidoscope, Pixelate, Warp, WarpFunc};
use texture_core::wave::{AcWave, DcWave, NlWave, PatternWave};
use texture_core::{
    Aff3, BoxedScalar, Cache, Circle, Fractal, NonLinear, OctaveCombiner, Perlin, Reflect,
    ScalarField, ScalarSpec, Transform, Uniform,
};

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

const FBM: OctaveCombiner = OctaveCombiner::Fbm {
    hurst: 1.0,
    lacunarity: 2.0,
};

/// Coordinates spread over several orders of magnitude in both signs.
fn coords(seed: u64, n: usize) -> Vec<(f64, f64)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let scale = [1.0, 100.0, 1e4, 1e6][i % 4];
            (
                rng.random_range(-1.0..1.0) * scale,
                rng.random_range(-1.0..1.0) * scale,
            )
        })
        .collect()
}

fn wave(lambda: f64) -> NlWave {
    NlWave::simple(lambda, NonLinear::Sin, true, false).unwrap()
}

/// Perlin noise is only approximately bounded, clip it for range checks.
fn noise(seed: u64) -> Filter<Perlin> {
    Filter::new(Perlin::new(seed), FilterOp::Clip { a: 1.0, b: 0.0 })
}

fn boxed(f: impl ScalarField + 'static) -> BoxedScalar {
    Box::new(f)
}

fn sierpinski() -> Ifs {
    let a = Aff3::scaling(0.5, 0.5);
    let mut b = Aff3::translation(50.0, 0.0);
    b.scale(0.5, 0.5);
    let mut c = Aff3::translation(0.0, 50.0);
    c.scale(0.5, 0.5);
    Ifs::new([100.0, 100.0], &[a, b, c], 3).unwrap()
}

fn nodes() -> Vec<(&'static str, BoxedScalar)> {
    let fbm = Fractal::new(Perlin::new(3), Aff3::scaling(2.0, 2.0), FBM, 4.0);
    let points = random_points(16, 256.0, 256.0, 9);
    vec![
        ("uniform", boxed(Uniform::new(0.3))),
        ("linear", boxed(LinearGradient::new(wave(37.0)))),
        ("radial", boxed(RadialGradient::new(wave(19.0)))),
        ("conic", boxed(ConicGradient::new(wave(1.0)))),
        (
            "dc_gradient",
            boxed(LinearGradient::new(
                DcWave::new(&[10.0, 20.0], &[NonLinear::Sin], false).unwrap(),
            )),
        ),
        (
            "ac_gradient",
            boxed(RadialGradient::new(
                AcWave::new(&[5.0], &[NonLinear::Linear], false).unwrap(),
            )),
        ),
        (
            "pattern_gradient",
            boxed(LinearGradient::new(
                PatternWave::new(vec![10.0], vec![vec![-1.0, 0.5, 1.0]], false, false).unwrap(),
            )),
        ),
        ("generator", boxed(Generator::new(23.0, 0.4, GenFunc::Triangle))),
        (
            "multi",
            boxed(Multi::new(vec![11.0, 17.0, 29.0], 1.1, GenFunc::Saw).unwrap()),
        ),
        ("squares", boxed(Squares::new(13.0).unwrap())),
        ("triangles", boxed(Triangles::new(13.0).unwrap())),
        ("hexagons", boxed(Hexagons::new(13.0).unwrap())),
        ("blocks", boxed(BlockNoise::new(40.0, 40.0, 8, 8, 0.5, 4).unwrap())),
        (
            "worley",
            boxed(
                WorleyField::new(
                    points,
                    vec![],
                    vec![1.0, -1.0],
                    Distance::Euclidean,
                    Falloff::NegExp,
                    1.0,
                    0.0,
                )
                .unwrap(),
            ),
        ),
        (
            "blinn",
            boxed(
                BlinnField::new(
                    random_points(8, 256.0, 256.0, 4),
                    vec![-0.05; 8],
                    vec![],
                    Distance::Euclidean,
                    Falloff::Exp,
                    0.5,
                    -0.5,
                )
                .unwrap(),
            ),
        ),
        ("ifs", boxed(sierpinski())),
        ("fbm", boxed(fbm)),
        (
            "variable_fractal",
            boxed(VariableFractal::new(
                Perlin::new(5),
                Aff3::scaling(2.0, 2.0),
                FBM,
                noise(6),
                6.0,
            )),
        ),
        (
            "tiler",
            boxed(Tiler::new(noise(1), [64.0, 48.0]).unwrap()),
        ),
        (
            "stochastic_tiler",
            boxed(StochasticTiler::new(vec![noise(1), noise(2)], [32.0, 32.0], 7).unwrap()),
        ),
        (
            "pixelate",
            boxed(Pixelate::new(noise(1), 4.0).unwrap()),
        ),
        (
            "kaleidoscope",
            boxed(Kaleidoscope::new(noise(1), [10.0, 10.0], 5, 0.0)),
        ),
        (
            "warp",
            boxed(Warp::new(
                noise(1),
                WarpFunc::Swirl {
                    center: [0.0, 0.0],
                    k: 0.01,
                },
            )),
        ),
        (
            "filter_pow",
            boxed(Filter::new(noise(1), FilterOp::Pow { a: 0.5, b: 0.2 })),
        ),
        (
            "combine_mul",
            boxed(Combiner2::new(noise(1), noise(2), BinaryOp::Mul)),
        ),
        (
            "combine_blend",
            boxed(Combiner3::new(noise(1), noise(2), noise(3), TernaryOp::Blend)),
        ),
        (
            "jitter_blend",
            boxed(JitterBlend::new(noise(1), noise(2), noise(3), 0.1)),
        ),
        (
            "shape_combiner",
            boxed(ShapeCombiner::new(
                Uniform::new(1.0),
                noise(2),
                Circle::new([0.0, 0.0], 50.0),
            )),
        ),
        (
            "shapes",
            boxed(ShapeField::new(
                vec![Circle::new([0.0, 0.0], 5.0), Circle::new([20.0, 0.0], 5.0)],
                ShapeStyle::default(),
            )),
        ),
        (
            "edge",
            boxed(Morphology::new(noise(1), Support::z8(1.0, 1.0), MorphOp::Edge)),
        ),
        (
            "convolution",
            boxed(Convolution::new(
                noise(1),
                Kernel::new(
                    vec![[-1.0, 0.0, -1.0], [0.0, 0.0, 4.0], [1.0, 0.0, -1.0]],
                    false,
                )
                .unwrap(),
            )),
        ),
        (
            "displace",
            boxed(Displace::new(noise(1), noise(2), noise(3), 8.0)),
        ),
        ("distort", boxed(Distort::new(noise(1), 5.0))),
        (
            "cache",
            boxed(Cache::new(noise(1), 1.0, 64).unwrap()),
        ),
    ]
}

#[test]
fn test_every_node_stays_in_range() {
    let pts = coords(42, 2_000);
    for (name, node) in nodes() {
        for &(x, y) in &pts {
            let v = node.eval(x, y);
            assert!(
                (-1.0..=1.0).contains(&v),
                "{name} returned {v} at ({x}, {y})"
            );
        }
    }
}

#[test]
fn test_tiler_is_periodic() {
    let domain = [64.0, 48.0];
    let t = Tiler::new(Perlin::new(11), domain).unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..1_000 {
        let x = rng.random_range(0.0..domain[0]);
        let y = rng.random_range(0.0..domain[1]);
        let k = f64::from(rng.random_range(-50i32..50));
        assert_abs_diff_eq!(
            t.eval(x, y),
            t.eval(x + k * domain[0], y + k * domain[1]),
            epsilon = 1e-9
        );
    }
}

#[test]
fn test_perlin_deterministic_per_seed() {
    let a = Perlin::new(77);
    let b = Perlin::new(77);
    let c = Perlin::new(78);
    let mut differs = false;
    for (x, y) in coords(5, 10_000) {
        let (x, y) = (x / 1e3, y / 1e3);
        assert_eq!(a.eval(x, y), b.eval(x, y));
        differs |= a.eval(x, y) != c.eval(x, y);
    }
    assert!(differs);
}

#[test]
fn test_perlin_zero_on_lattice() {
    let p = Perlin::new(12345);
    assert_eq!(p.eval(0.0, 0.0), 0.0);
    assert_eq!(p.eval(7.0, -3.0), 0.0);
}

#[test]
fn test_reflect_twice_same_as_once() {
    let once = Reflect::new(Perlin::new(2), [0.0, 0.0], [10.0, 3.0]);
    let twice = Reflect::new(
        Reflect::new(Perlin::new(2), [0.0, 0.0], [10.0, 3.0]),
        [0.0, 0.0],
        [10.0, 3.0],
    );
    for (x, y) in coords(8, 1_000) {
        let (x, y) = (x / 1e2, y / 1e2);
        assert_abs_diff_eq!(once.eval(x, y), twice.eval(x, y), epsilon = 1e-12);
    }
}

#[test]
fn test_kaleidoscope_folds_outermost_mirror_first() {
    let (center, d, n, offset) = ([5.0, -3.0], 20.0, 3, 0.2);
    let kal = Kaleidoscope::with_rim(Perlin::new(2), center, d, n, offset);

    let th = std::f64::consts::PI / n as f64;
    let pts: Vec<[f64; 2]> = (0..n)
        .map(|i| {
            let a = offset + th * i as f64;
            [center[0] + a.cos() * d, center[1] + a.sin() * d]
        })
        .collect();
    let mut lines: Vec<([f64; 2], [f64; 2])> = pts.iter().map(|p| (center, *p)).collect();
    for i in 0..n {
        lines.push((pts[i], pts[(i + 1) % n]));
    }

    // The last mirror wraps everything else so it folds the query first
    let mut nested = boxed(Perlin::new(2));
    for (start, end) in lines {
        nested = boxed(Reflect::new(nested, start, end));
    }

    for (x, y) in coords(13, 1_000) {
        let (x, y) = (x / 1e3, y / 1e3);
        assert_abs_diff_eq!(kal.eval(x, y), nested.eval(x, y), epsilon = 1e-12);
    }
}

#[test]
fn test_degenerate_descriptions_rejected() {
    let bad = [
        r#"{"type":"shapes","shapes":[{"shape":"polygon","points":[]}]}"#,
        r#"{"type":"shapes","shapes":[{"shape":"polygon","points":[[0.0,0.0],[1.0,1.0]]}]}"#,
        r#"{"type":"linear_gradient","wave":{"type":"dc","up":0.0,"down":0.0,
            "nl_up":{"nl":"linear"},"nl_down":{"nl":"linear"}}}"#,
        r#"{"type":"radial_gradient","wave":{"type":"ac","lambdas":[0.0],
            "nlfs":[{"nl":"linear"}]}}"#,
        r#"{"type":"worley","points":[],"b":[1.0],"scale":1.0}"#,
        r#"{"type":"worley","points":[[0.0,0.0]],"b":[],"scale":1.0}"#,
        r#"{"type":"blinn","points":[],"scale":1.0}"#,
    ];
    for json in bad {
        assert!(
            serde_json::from_str::<ScalarSpec>(json).is_err(),
            "accepted {json}"
        );
    }
}

#[test]
fn test_zero_wavelength_warp_stays_finite() {
    let funcs = [
        r#"{"warp":"ripple_x","lambda":0.0,"amplitude":5.0,"phase":0.0}"#,
        r#"{"warp":"radial_ripple","center":[0.0,0.0],"lambda":0.0,"amplitude":5.0,"phase":0.0}"#,
        r#"{"warp":"radial_wiggle","center":[0.0,0.0],"lambda":0.0,"amplitude":5.0,"phase":1.0}"#,
    ];
    for json in funcs {
        let func: WarpFunc = serde_json::from_str(json).unwrap();
        let warp = Warp::new(noise(4), func);
        for (x, y) in coords(21, 500) {
            let v = warp.eval(x, y);
            assert!((-1.0..=1.0).contains(&v), "{json} returned {v} at ({x}, {y})");
        }
    }

    let spec: ScalarSpec = serde_json::from_str(
        r#"{"type":"warp","src":{"type":"perlin","seed":4},
            "func":{"warp":"ripple_x","lambda":0.0,"amplitude":5.0,"phase":0.0}}"#,
    )
    .unwrap();
    let node = spec.build().unwrap();
    assert!(node.eval(3.0, 0.5).is_finite());
}

#[test]
fn test_cache_is_transparent() {
    let src = Fractal::new(Perlin::new(4), Aff3::scaling(2.0, 2.0), FBM, 3.0);
    for (res, limit) in [(0.25, 1), (1.0, 7), (10.0, 1_000)] {
        let cache = Cache::new(&src, res, limit).unwrap();
        let pts = coords(res.to_bits(), 500);
        // Each point twice so some lookups hit
        for &(x, y) in pts.iter().chain(pts.iter()) {
            let (x, y) = (x / 1e3, y / 1e3);
            assert_eq!(cache.eval(x, y), src.eval(x, y));
        }
    }
}

#[test]
fn test_erode_below_dilate() {
    let f = Transform::new(Perlin::new(9), Aff3::scaling(0.1, 0.1));
    let support = Support::custom(vec![[1.5, 0.0], [-2.0, 1.0], [0.5, -3.0]]).unwrap();
    let erode = Morphology::new(&f, support.clone(), MorphOp::Erode);
    let dilate = Morphology::new(&f, support, MorphOp::Dilate);
    for (x, y) in coords(3, 1_000) {
        let v = f.eval(x, y);
        assert!(erode.eval(x, y) <= v);
        assert!(v <= dilate.eval(x, y));
    }
}

#[test]
fn test_squares_parity_flip() {
    let s = Squares::new(40.0).unwrap();
    assert_eq!(s.eval(0.0, 0.0), 1.0);
    assert_eq!(s.eval(40.0, 0.0), -1.0);
}

#[test]
fn test_two_octave_fbm_closed_form() {
    let f = Fractal::new(Uniform::new(1.0), Aff3::scaling(2.0, 2.0), FBM, 2.0);
    let w = FBM.weights();
    for (x, y) in coords(6, 100) {
        assert_abs_diff_eq!(f.eval(x, y), w[0] + w[1], epsilon = 1e-12);
    }
    assert_abs_diff_eq!(w[0] + w[1], 0.75, epsilon = 1e-12);
}

#[test]
fn test_ifs_rejects_degenerate_maps() {
    assert!(Ifs::new([10.0, 10.0], &[], 3).is_err());
    assert!(Ifs::new([10.0, 10.0], &[Aff3::scaling(0.0, 1.0)], 3).is_err());
}
