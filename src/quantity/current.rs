quantity!(Milliamps, via: f64, suffix: "mA", precision: 1);
