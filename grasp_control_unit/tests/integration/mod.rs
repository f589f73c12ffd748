mod coupling;
mod safety;
