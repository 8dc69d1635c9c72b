quantity!(MilliwattHours, via: f64, suffix: "mWh", precision: 2);
