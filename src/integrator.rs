//! Classical 4th-order Runge-Kutta stepper for a single scalar state.

/// Right-hand side of `dY/dt = f(Y, t)`.
///
/// Implemented for plain closures; solvers that need context (drag factor,
/// temperature, drag table) implement it on a small value type instead of
/// capturing their owner.
pub trait Derivative {
    fn dydt(&self, y: f64, t: f64) -> f64;
}

impl<F> Derivative for F
where
    F: Fn(f64, f64) -> f64,
{
    fn dydt(&self, y: f64, t: f64) -> f64 {
        self(y, t)
    }
}

/// Fixed-step RK4 integrator over one scalar.
///
/// No stability or divergence checks are made: the step `h` must be small
/// relative to the time constants of the derivative.
#[derive(Debug, Clone)]
pub struct RungeKutta4<D: Derivative> {
    derivative: D,
    y0: f64,
    y: f64,
    t: f64,
    h: f64,
}

impl<D: Derivative> RungeKutta4<D> {
    /// Set up the stepper at `t = 0`, `Y = y0`.
    pub fn new(y0: f64, h: f64, derivative: D) -> Self {
        Self {
            derivative,
            y0,
            y: y0,
            t: 0.0,
            h,
        }
    }

    /// Back to `t = 0`, `Y = y0`, keeping the derivative.
    pub fn reset(&mut self) {
        self.t = 0.0;
        self.y = self.y0;
    }

    /// Replace the initial value, then [`reset`](Self::reset).
    pub fn reset_to(&mut self, y0: f64) {
        self.y0 = y0;
        self.reset();
    }

    /// One RK4 step of size `h`; returns the new `Y`.
    pub fn advance(&mut self) -> f64 {
        let h = self.h;
        let half_h = 0.5 * h;
        let (y, t) = (self.y, self.t);

        let k1 = self.derivative.dydt(y, t);
        let k2 = self.derivative.dydt(y + half_h * k1, t + half_h);
        let k3 = self.derivative.dydt(y + half_h * k2, t + half_h);
        let k4 = self.derivative.dydt(y + h * k3, t + h);

        self.y = y + (h / 6.0) * (k1 + 2.0 * k2 + 2.0 * k3 + k4);
        self.t += h;
        self.y
    }

    pub fn value(&self) -> f64 {
        self.y
    }

    pub fn time(&self) -> f64 {
        self.t
    }

    pub fn step(&self) -> f64 {
        self.h
    }

    pub fn derivative(&self) -> &D {
        &self.derivative
    }

    pub fn derivative_mut(&mut self) -> &mut D {
        &mut self.derivative
    }
}
