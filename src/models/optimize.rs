//! Nelder-Mead simplex minimizer used by the ARIMA likelihood fit.
//!
//! Derivative-free, which suits the conditional-sum-of-squares objective:
//! the stationarity/invertibility penalty makes it non-smooth at the
//! boundary of the admissible region.

/// Outcome of a minimization run.
#[derive(Debug, Clone)]
pub struct OptimizeResult {
    pub point: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Nelder-Mead downhill simplex.
#[derive(Debug, Clone)]
pub struct NelderMead {
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            max_iterations: 2000,
            tolerance: 1e-8,
        }
    }
}

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

impl NelderMead {
    /// Minimize `f` starting from `start`. A zero-dimensional start is
    /// returned unchanged.
    pub fn minimize<F: FnMut(&[f64]) -> f64>(&self, mut f: F, start: &[f64]) -> OptimizeResult {
        let dim = start.len();
        if dim == 0 {
            let value = f(start);
            return OptimizeResult {
                point: Vec::new(),
                value,
                iterations: 0,
                converged: true,
            };
        }

        // Initial simplex: perturb each coordinate in turn.
        let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(dim + 1);
        simplex.push(start.to_vec());
        for i in 0..dim {
            let mut vertex = start.to_vec();
            let step = if vertex[i].abs() > 1e-8 {
                0.1 * vertex[i].abs()
            } else {
                0.1
            };
            vertex[i] += step;
            simplex.push(vertex);
        }
        let mut values: Vec<f64> = simplex.iter().map(|v| f(v)).collect();

        let mut iterations = 0;
        let mut converged = false;
        while iterations < self.max_iterations {
            iterations += 1;

            // Order vertices best to worst.
            let mut order: Vec<usize> = (0..=dim).collect();
            order.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).expect("non-finite value"));
            let best = order[0];
            let worst = order[dim];
            let second_worst = order[dim - 1];

            if (values[worst] - values[best]).abs()
                <= self.tolerance * (values[best].abs() + self.tolerance)
            {
                converged = true;
                break;
            }

            // Centroid of all vertices except the worst.
            let mut centroid = vec![0.0; dim];
            for (idx, vertex) in simplex.iter().enumerate() {
                if idx == worst {
                    continue;
                }
                for (c, v) in centroid.iter_mut().zip(vertex.iter()) {
                    *c += v / dim as f64;
                }
            }

            let reflect: Vec<f64> = centroid
                .iter()
                .zip(simplex[worst].iter())
                .map(|(c, w)| c + REFLECTION * (c - w))
                .collect();
            let reflect_value = f(&reflect);

            if reflect_value < values[best] {
                // Try expanding further in the same direction.
                let expand: Vec<f64> = centroid
                    .iter()
                    .zip(simplex[worst].iter())
                    .map(|(c, w)| c + EXPANSION * (c - w))
                    .collect();
                let expand_value = f(&expand);
                if expand_value < reflect_value {
                    simplex[worst] = expand;
                    values[worst] = expand_value;
                } else {
                    simplex[worst] = reflect;
                    values[worst] = reflect_value;
                }
            } else if reflect_value < values[second_worst] {
                simplex[worst] = reflect;
                values[worst] = reflect_value;
            } else {
                // Contract toward the centroid.
                let contract: Vec<f64> = centroid
                    .iter()
                    .zip(simplex[worst].iter())
                    .map(|(c, w)| c + CONTRACTION * (w - c))
                    .collect();
                let contract_value = f(&contract);
                if contract_value < values[worst] {
                    simplex[worst] = contract;
                    values[worst] = contract_value;
                } else {
                    // Shrink everything toward the best vertex.
                    let best_vertex = simplex[best].clone();
                    for (idx, vertex) in simplex.iter_mut().enumerate() {
                        if idx == best {
                            continue;
                        }
                        for (v, b) in vertex.iter_mut().zip(best_vertex.iter()) {
                            *v = b + SHRINK * (*v - b);
                        }
                        values[idx] = f(vertex);
                    }
                }
            }
        }

        let best = (0..=dim)
            .min_by(|&a, &b| values[a].partial_cmp(&values[b]).expect("non-finite value"))
            .unwrap_or(0);
        OptimizeResult {
            point: simplex[best].clone(),
            value: values[best],
            iterations,
            converged,
        }
    }
}
