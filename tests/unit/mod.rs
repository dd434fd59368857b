mod laws;
mod scenarios;
mod stress;
