//! Fixed-step integrators
//!
//! Two steppers cover everything the crate simulates:
//!
//! - **RK4** for deterministic right-hand sides (the compartmental
//!   glucose-insulin model)
//! - **Euler–Maruyama** for SDEs with additive noise (the stochastic neuron)
//!
//!   x(t+dt) = x(t) + f(x)·dt + σ·√dt·ξ,   ξ ~ N(0, 1)
//!
//! Both check the new state for NaN/Inf before handing it back, so a
//! diverging model fails at the offending step instead of being silently
//! integrated forward.

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::error::{DynamicsError, Result};

/// Autonomous or time-dependent ODE right-hand side
pub trait OdeSystem {
    /// Number of state components
    fn dimension(&self) -> usize;

    /// Write dy/dt at (t, y) into `dydt`
    fn derivative(&self, t: f64, y: &[f64], dydt: &mut [f64]);
}

/// Fail with a `Numerical` error on the first non-finite component
pub fn ensure_finite(values: &[f64], quantity: &'static str, time: f64) -> Result<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(DynamicsError::Numerical { quantity, index, time }),
        None => Ok(()),
    }
}

/// Classical fourth-order Runge-Kutta step
///
/// Returns the state at `t + dt`. The input must have `system.dimension()`
/// components.
pub fn rk4_step<S: OdeSystem + ?Sized>(system: &S, t: f64, y: &[f64], dt: f64) -> Result<Vec<f64>> {
    let n = system.dimension();
    if y.len() != n {
        return Err(DynamicsError::config(format!(
            "state has {} components, system expects {}",
            y.len(),
            n
        )));
    }

    // k1
    let mut k1 = vec![0.0; n];
    system.derivative(t, y, &mut k1);

    // k2
    let y_mid1: Vec<f64> = y.iter().zip(&k1).map(|(y, k)| y + k * dt / 2.0).collect();
    let mut k2 = vec![0.0; n];
    system.derivative(t + dt / 2.0, &y_mid1, &mut k2);

    // k3
    let y_mid2: Vec<f64> = y.iter().zip(&k2).map(|(y, k)| y + k * dt / 2.0).collect();
    let mut k3 = vec![0.0; n];
    system.derivative(t + dt / 2.0, &y_mid2, &mut k3);

    // k4
    let y_end: Vec<f64> = y.iter().zip(&k3).map(|(y, k)| y + k * dt).collect();
    let mut k4 = vec![0.0; n];
    system.derivative(t + dt, &y_end, &mut k4);

    let next: Vec<f64> = (0..n)
        .map(|i| y[i] + (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]) * dt / 6.0)
        .collect();

    ensure_finite(&next, "state", t + dt)?;
    Ok(next)
}

/// Euler–Maruyama step with additive, diagonal noise
///
/// `diffusion[i]` is the noise intensity σᵢ on component i; zero entries
/// make that component deterministic. The state is updated in place.
pub fn euler_maruyama_step<S, R>(
    system: &S,
    t: f64,
    y: &mut [f64],
    diffusion: &[f64],
    dt: f64,
    rng: &mut R,
) -> Result<()>
where
    S: OdeSystem + ?Sized,
    R: Rng + ?Sized,
{
    let n = system.dimension();
    if y.len() != n || diffusion.len() != n {
        return Err(DynamicsError::config(format!(
            "state/diffusion lengths {}/{} do not match system dimension {}",
            y.len(),
            diffusion.len(),
            n
        )));
    }

    let mut drift = vec![0.0; n];
    system.derivative(t, y, &mut drift);

    let sqrt_dt = dt.sqrt();
    for i in 0..n {
        let noise = if diffusion[i] == 0.0 {
            0.0
        } else {
            let xi: f64 = StandardNormal.sample(rng);
            diffusion[i] * sqrt_dt * xi
        };
        y[i] += drift[i] * dt + noise;
    }

    ensure_finite(y, "state", t + dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// dy/dt = -λy
    struct Decay {
        lambda: f64,
    }

    impl OdeSystem for Decay {
        fn dimension(&self) -> usize {
            1
        }

        fn derivative(&self, _t: f64, y: &[f64], dydt: &mut [f64]) {
            dydt[0] = -self.lambda * y[0];
        }
    }

    /// Blows up on the first evaluation
    struct Singular;

    impl OdeSystem for Singular {
        fn dimension(&self) -> usize {
            2
        }

        fn derivative(&self, _t: f64, y: &[f64], dydt: &mut [f64]) {
            dydt[0] = 1.0 / (y[0] - y[0]);
            dydt[1] = 0.0;
        }
    }

    #[test]
    fn test_rk4_exponential_decay() {
        let system = Decay { lambda: 0.5 };
        let dt = 0.01;
        let mut y = vec![1.0];
        let mut t = 0.0;
        for _ in 0..200 {
            y = rk4_step(&system, t, &y, dt).unwrap();
            t += dt;
        }

        let exact = (-0.5f64 * 2.0).exp();
        assert!((y[0] - exact).abs() < 1e-9, "RK4 error too large: {} vs {}", y[0], exact);
    }

    #[test]
    fn test_rk4_rejects_wrong_dimension() {
        let system = Decay { lambda: 1.0 };
        let result = rk4_step(&system, 0.0, &[1.0, 2.0], 0.1);
        assert!(matches!(result, Err(DynamicsError::Configuration(_))));
    }

    #[test]
    fn test_rk4_surfaces_non_finite_state() {
        let result = rk4_step(&Singular, 0.0, &[1.0, 0.0], 0.1);
        match result {
            Err(DynamicsError::Numerical { index, .. }) => assert_eq!(index, 0),
            other => panic!("Expected numerical error, got {:?}", other),
        }
    }

    #[test]
    fn test_euler_maruyama_zero_noise_is_euler() {
        let system = Decay { lambda: 2.0 };
        let mut rng = StdRng::seed_from_u64(7);
        let mut y = vec![1.0];
        euler_maruyama_step(&system, 0.0, &mut y, &[0.0], 0.1, &mut rng).unwrap();
        assert!((y[0] - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_euler_maruyama_seeded_is_reproducible() {
        let system = Decay { lambda: 0.1 };
        let run = |seed: u64| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut y = vec![1.0];
            for k in 0..50 {
                euler_maruyama_step(&system, k as f64 * 0.1, &mut y, &[0.5], 0.1, &mut rng).unwrap();
            }
            y[0]
        };

        assert_eq!(run(42).to_bits(), run(42).to_bits());
        assert_ne!(run(42).to_bits(), run(43).to_bits());
    }

    #[test]
    fn test_ensure_finite_reports_index() {
        let err = ensure_finite(&[0.0, 1.0, f64::INFINITY], "rate", 3.0).unwrap_err();
        match err {
            DynamicsError::Numerical { quantity, index, time } => {
                assert_eq!(quantity, "rate");
                assert_eq!(index, 2);
                assert_eq!(time, 3.0);
            }
            other => panic!("Unexpected error {:?}", other),
        }
    }
}
