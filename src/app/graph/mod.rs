mod build;
mod interaction;
mod minimap;
mod view;
