mod edges;
mod kinematics;
mod properties;
mod softening;
mod tangent;
