//! Small-displacement kinematics of plane elements.
use crate::error::FemDemError;
use crate::Real;
use itertools::Itertools;
use nalgebra::{distance, Matrix2, Matrix2x3, Matrix3x6, Point2, Vector2, Vector3, Vector6};
use numeric_literals::replace_float_literals;

/// Geometry and kinematics of an element, as seen by the damage integration.
///
/// Implementations provide the strain-displacement operator for the element's integration
/// points. The element DOFs are ordered node-wise, $(u_0, v_0, u_1, v_1, u_2, v_2)$, and strains
/// are Voigt vectors $(\epsilon_{xx}, \epsilon_{yy}, \gamma_{xy})$.
pub trait ElementKinematics<T: Real> {
    fn number_of_edges(&self) -> usize;

    fn num_integration_points(&self) -> usize;

    /// The strain-displacement matrix $\vec B$ such that $\vec \epsilon = \vec B \vec u$.
    fn strain_displacement_matrix(&self, point: usize) -> Result<Matrix3x6<T>, FemDemError>;

    /// Quadrature weight times Jacobian determinant times thickness.
    fn integration_weight(&self, point: usize) -> Result<T, FemDemError>;

    /// Values of the nodal shape functions at the integration point.
    fn shape_functions(&self, point: usize) -> Vector3<T>;

    /// Length used to regularize the softening law with respect to the element size.
    fn characteristic_length(&self) -> T;

    /// Area times thickness.
    fn measure(&self) -> Result<T, FemDemError>;

    fn strain(&self, point: usize, displacements: &Vector6<T>) -> Result<Vector3<T>, FemDemError> {
        Ok(self.strain_displacement_matrix(point)? * displacements)
    }
}

/// Linear three-node triangle with a single integration point at the centroid.
///
/// The reference element is the triangle with corners (-1, -1), (1, -1), (-1, 1), so the
/// single quadrature point is $(-1/3, -1/3)$ with weight 2.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Tri3Kinematics<T: Real> {
    vertices: [Point2<T>; 3],
    thickness: T,
}

impl<T: Real> Tri3Kinematics<T> {
    pub fn from_vertices(vertices: [Point2<T>; 3]) -> Self {
        Self {
            vertices,
            thickness: T::one(),
        }
    }

    pub fn with_thickness(self, thickness: T) -> Self {
        Self { thickness, ..self }
    }

    pub fn vertices(&self) -> &[Point2<T>; 3] {
        &self.vertices
    }

    pub fn thickness(&self) -> T {
        self.thickness
    }

    #[rustfmt::skip]
    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    fn reference_gradients() -> Matrix2x3<T> {
        Matrix2x3::from_columns(&[
            Vector2::new(-0.5, -0.5),
            Vector2::new(0.5, 0.0),
            Vector2::new(0.0, 0.5)
        ])
    }

    #[allow(non_snake_case)]
    pub fn reference_jacobian(&self) -> Matrix2<T> {
        let X: Matrix2x3<T> = Matrix2x3::from_fn(|i, j| self.vertices[j][i]);
        X * Self::reference_gradients().transpose()
    }

    fn checked_jacobian_determinant(&self) -> Result<T, FemDemError> {
        let det = self.reference_jacobian().determinant();
        if det <= T::zero() {
            Err(FemDemError::SingularJacobian(det.to_string()))
        } else {
            Ok(det)
        }
    }

    /// Cartesian gradients of the shape functions, one column per node.
    #[allow(non_snake_case)]
    pub fn physical_gradients(&self) -> Result<Matrix2x3<T>, FemDemError> {
        self.checked_jacobian_determinant()?;
        let J_inv_t = self
            .reference_jacobian()
            .try_inverse()
            .ok_or_else(|| FemDemError::SingularJacobian("0".to_string()))?
            .transpose();
        Ok(J_inv_t * Self::reference_gradients())
    }
}

impl<T: Real> ElementKinematics<T> for Tri3Kinematics<T> {
    fn number_of_edges(&self) -> usize {
        3
    }

    fn num_integration_points(&self) -> usize {
        1
    }

    #[allow(non_snake_case)]
    fn strain_displacement_matrix(&self, _point: usize) -> Result<Matrix3x6<T>, FemDemError> {
        let dN_dX = self.physical_gradients()?;
        let mut B = Matrix3x6::zeros();
        for i in 0..3 {
            let (dx, dy) = (dN_dX[(0, i)], dN_dX[(1, i)]);
            B[(0, 2 * i)] = dx;
            B[(1, 2 * i + 1)] = dy;
            B[(2, 2 * i)] = dy;
            B[(2, 2 * i + 1)] = dx;
        }
        Ok(B)
    }

    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    fn integration_weight(&self, _point: usize) -> Result<T, FemDemError> {
        Ok(2.0 * self.checked_jacobian_determinant()? * self.thickness)
    }

    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    fn shape_functions(&self, _point: usize) -> Vector3<T> {
        Vector3::repeat(1.0 / 3.0)
    }

    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    fn characteristic_length(&self) -> T {
        let perimeter = self
            .vertices
            .iter()
            .circular_tuple_windows()
            .map(|(a, b)| distance(a, b))
            .fold(T::zero(), |sum, length| sum + length);
        perimeter / 3.0
    }

    fn measure(&self) -> Result<T, FemDemError> {
        self.integration_weight(0)
    }
}
