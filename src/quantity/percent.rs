quantity!(Percent, via: f64, suffix: "%", precision: 0);
