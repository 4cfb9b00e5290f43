use crate::error::{positive, Result};
use crate::field::ScalarField;
use crate::geometry::Aff3;
use crate::wave::Wave;

/// Samples the source at `xfm(x, y)`.
#[derive(Debug, Clone)]
pub struct Transform<S> {
    pub src: S,
    pub xfm: Aff3,
}

impl<S> Transform<S> {
    pub fn new(src: S, xfm: Aff3) -> Self {
        Self { src, xfm }
    }

    #[inline]
    fn map(&self, x: f64, y: f64) -> (f64, f64) {
        self.xfm.apply(x, y)
    }
}

remap_fields!(Transform);

/// Samples the source at the center of the `resolution` sized cell holding
/// the point. No averaging is done.
#[derive(Debug, Clone)]
pub struct Pixelate<S> {
    pub src: S,
    pub resolution: f64,
}

impl<S> Pixelate<S> {
    /// Fails unless `resolution` is positive.
    pub fn new(src: S, resolution: f64) -> Result<Self> {
        Ok(Self {
            src,
            resolution: positive("pixelate resolution", resolution)?,
        })
    }

    #[inline]
    fn map(&self, x: f64, y: f64) -> (f64, f64) {
        let res = self.resolution;
        let half = res / 2.0;
        ((x / res).floor() * res + half, (y / res).floor() * res + half)
    }
}

remap_fields!(Pixelate);

/// Samples the source along the horizontal line `y = value`.
#[derive(Debug, Clone)]
pub struct Strip<S> {
    pub src: S,
    pub value: f64,
}

impl<S> Strip<S> {
    pub fn new(src: S, value: f64) -> Self {
        Self { src, value }
    }

    #[inline]
    fn map(&self, x: f64, _y: f64) -> (f64, f64) {
        (x, self.value)
    }
}

remap_fields!(Strip);

/// A strip through a scalar field is a wave that never repeats.
impl<S: ScalarField> Wave for Strip<S> {
    fn eval(&self, v: f64) -> f64 {
        self.src.eval(v, self.value)
    }

    fn lambda(&self) -> f64 {
        f64::MAX
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::field::{ColorField, FnField, UniformColor};
    use crate::gradient::LinearGradient;
    use approx::assert_abs_diff_eq;

    fn ramp() -> FnField<impl Fn(f64, f64) -> f64 + Send + Sync> {
        FnField(|x: f64, y: f64| {
            (x / 100.0).clamp(-1.0, 1.0) * 0.5 + (y / 100.0).clamp(-1.0, 1.0) * 0.5
        })
    }

    #[test]
    fn test_transform_translates() {
        let t = Transform::new(ramp(), Aff3::translation(10.0, 0.0));
        assert_abs_diff_eq!(ScalarField::eval(&t, 0.0, 0.0), 0.05, epsilon = 1e-12);
        let c = Transform::new(UniformColor::new(Color::WHITE), Aff3::rotation(1.0));
        assert_eq!(ColorField::eval(&c, 3.0, 4.0), Color::WHITE);
    }

    #[test]
    fn test_pixelate_cell_centers() {
        let p = Pixelate::new(ramp(), 10.0).unwrap();
        assert_eq!(p.map(3.0, 17.0), (5.0, 15.0));
        assert_eq!(p.map(-3.0, -10.5), (-5.0, -15.0));
        assert_eq!(ScalarField::eval(&p, 1.0, 1.0), ScalarField::eval(&p, 9.0, 9.0));
        assert!(Pixelate::new(ramp(), 0.0).is_err());
    }

    #[test]
    fn test_strip_as_wave() {
        let s = Strip::new(ramp(), 20.0);
        assert_abs_diff_eq!(ScalarField::eval(&s, 40.0, -70.0), 0.3, epsilon = 1e-12);
        assert_abs_diff_eq!(Wave::eval(&s, 40.0), 0.3, epsilon = 1e-12);
        assert_eq!(s.lambda(), f64::MAX);
        let g = LinearGradient::new(s);
        assert_abs_diff_eq!(g.eval(40.0, 5.0), 0.3, epsilon = 1e-12);
    }
}
