pub mod formulas;

pub use formulas::{
    compute_bmi, compute_water_intake, parse_measurement, ActivityLevel, BmiCategory, BmiResult,
};
