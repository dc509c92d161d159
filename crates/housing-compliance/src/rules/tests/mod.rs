mod common;
mod evaluation;
mod loading;
mod ordering;
