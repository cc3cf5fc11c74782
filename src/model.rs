//! Mesh-wide driver of the FEM-DEM elements.
//!
//! The model runs the phases of a nonlinear solution step over all elements. Elements only
//! read the states their neighbours published in the preceding phase, so each phase runs in
//! parallel over the elements. Scattering into global structures and committing converged
//! state are sequential.
use crate::constitutive::ConstitutiveLaw;
use crate::element::{FemDemElement, LocalSystem, ProcessInfo, Tri3Kinematics, VoigtState};
use crate::mesh::{Tri3Connectivity, TriangleMesh2d};
use crate::properties::DamageProperties;
use crate::Real;
use eyre::{eyre, WrapErr};
use log::{debug, info, warn};
use nalgebra::{DVector, Matrix6, Vector6};
use nalgebra_sparse::{CooMatrix, CsrMatrix};
use rayon::prelude::*;
use std::sync::Arc;

pub type Tri3FemDemElement<T> = FemDemElement<T, Tri3Kinematics<T>>;

/// Gathers the element DOFs $(u_0, v_0, u_1, v_1, u_2, v_2)$ from a global displacement vector.
fn gather_element_displacements<T: Real>(conn: &Tri3Connectivity, u: &DVector<T>) -> Vector6<T> {
    Vector6::from_fn(|i, _| u[2 * conn[i / 2] + i % 2])
}

fn scatter_element_matrix<T: Real>(coo: &mut CooMatrix<T>, conn: &Tri3Connectivity, matrix: &Matrix6<T>) {
    for (i, j) in itertools::iproduct!(0..6, 0..6) {
        coo.push(2 * conn[i / 2] + i % 2, 2 * conn[j / 2] + j % 2, matrix[(i, j)]);
    }
}

#[derive(Debug, Clone)]
pub struct FemDemModel<T: Real, L> {
    mesh: TriangleMesh2d<T>,
    properties: Arc<DamageProperties<T>>,
    law: L,
    elements: Vec<Tri3FemDemElement<T>>,
    /// States published for the current nonlinear iteration.
    states: Option<Vec<VoigtState<T>>>,
    process_info: ProcessInfo<T>,
}

impl<T, L> FemDemModel<T, L>
where
    T: Real,
    L: ConstitutiveLaw<T> + Sync,
{
    /// Builds one element per cell and connects the elements across shared edges.
    pub fn new(mesh: TriangleMesh2d<T>, properties: DamageProperties<T>, law: L) -> eyre::Result<Self> {
        if properties.uses_default_friction_angle() {
            warn!(
                "Friction angle not defined for the {} yield surface, assumed equal to 32 degrees",
                properties.yield_surface
            );
        }
        let properties = Arc::new(properties);
        let neighbours = mesh.compute_edge_neighbours();

        let elements = neighbours
            .into_iter()
            .enumerate()
            .map(|(cell_idx, cell_neighbours)| {
                let vertices = mesh
                    .cell(cell_idx)
                    .ok_or_else(|| eyre!("cell {} references a vertex out of bounds", cell_idx))?;
                let kinematics = Tri3Kinematics::from_vertices(vertices).with_thickness(properties.thickness());
                let mut element = FemDemElement::new(kinematics, Arc::clone(&properties));
                element
                    .set_neighbours(cell_neighbours)
                    .and_then(|_| element.kinematics().physical_gradients().map(|_| ()))
                    .wrap_err_with(|| format!("failed to set up element {}", cell_idx))?;
                Ok(element)
            })
            .collect::<eyre::Result<Vec<_>>>()?;

        info!(
            "Created FEM-DEM model with {} elements ({} yield surface)",
            elements.len(),
            properties.yield_surface
        );

        Ok(Self {
            states: None,
            mesh,
            properties,
            law,
            elements,
            process_info: ProcessInfo::default(),
        })
    }

    pub fn mesh(&self) -> &TriangleMesh2d<T> {
        &self.mesh
    }

    pub fn properties(&self) -> &DamageProperties<T> {
        &self.properties
    }

    pub fn law(&self) -> &L {
        &self.law
    }

    pub fn elements(&self) -> &[Tri3FemDemElement<T>] {
        &self.elements
    }

    /// States published in the last call to [`initialize_non_linear_iteration`](Self::initialize_non_linear_iteration),
    /// or `None` if no states have been published since the last converged step.
    pub fn states(&self) -> Option<&[VoigtState<T>]> {
        self.states.as_deref()
    }

    pub fn process_info(&self) -> &ProcessInfo<T> {
        &self.process_info
    }

    pub fn set_process_info(&mut self, process_info: ProcessInfo<T>) {
        self.process_info = process_info;
    }

    pub fn num_dofs(&self) -> usize {
        2 * self.mesh.vertices().len()
    }

    pub fn element_damages(&self) -> Vec<T> {
        self.elements.iter().map(|element| element.damage()).collect()
    }

    pub fn active_flags(&self) -> Vec<bool> {
        self.elements.iter().map(|element| element.is_active()).collect()
    }

    pub fn num_active_elements(&self) -> usize {
        self.elements.iter().filter(|element| element.is_active()).count()
    }

    fn check_displacements(&self, u: &DVector<T>) -> eyre::Result<()> {
        if u.len() != self.num_dofs() {
            Err(eyre!(
                "displacement vector has length {}, but the mesh has {} DOFs",
                u.len(),
                self.num_dofs()
            ))
        } else {
            Ok(())
        }
    }

    pub fn initialize_solution_step(&mut self) {
        self.elements
            .par_iter_mut()
            .for_each(|element| element.initialize_solution_step());
    }

    /// Publishes the predictive stress and strain of every element for the displacements `u`.
    pub fn initialize_non_linear_iteration(&mut self, u: &DVector<T>) -> eyre::Result<()> {
        self.check_displacements(u)?;
        let law = &self.law;
        let connectivity = self.mesh.connectivity();
        self.elements
            .par_iter_mut()
            .zip(connectivity.par_iter())
            .enumerate()
            .try_for_each(|(element_idx, (element, conn))| {
                let u_element = gather_element_displacements(conn, u);
                element
                    .initialize_non_linear_iteration(law, &u_element)
                    .wrap_err_with(|| format!("failed to initialize iteration of element {}", element_idx))
            })?;

        self.states = Some(self.elements.iter().map(|element| *element.state()).collect());
        Ok(())
    }

    /// Assembles the global stiffness matrix and residual (external minus internal forces).
    ///
    /// Inactive elements are skipped. Fails unless the states have been published by
    /// [`initialize_non_linear_iteration`](Self::initialize_non_linear_iteration) since the
    /// last converged step.
    pub fn assemble_system(&mut self, u: &DVector<T>) -> eyre::Result<(CsrMatrix<T>, DVector<T>)> {
        self.check_displacements(u)?;
        let law = &self.law;
        let states = self.states.as_ref().ok_or_else(|| {
            eyre!("element states have not been published, call initialize_non_linear_iteration first")
        })?;
        let process_info = &self.process_info;
        let connectivity = self.mesh.connectivity();

        let local_systems: Vec<Option<LocalSystem<T>>> = self
            .elements
            .par_iter_mut()
            .zip(connectivity.par_iter())
            .enumerate()
            .map(|(element_idx, (element, conn))| {
                if !element.is_active() {
                    return Ok(None);
                }
                let u_element = gather_element_displacements(conn, u);
                element
                    .calculate_local_system(law, &u_element, states, process_info)
                    .map(Some)
                    .wrap_err_with(|| format!("failed to compute local system of element {}", element_idx))
            })
            .collect::<eyre::Result<_>>()?;

        let n = self.num_dofs();
        let mut coo = CooMatrix::new(n, n);
        let mut rhs = DVector::zeros(n);
        for (conn, system) in connectivity.iter().zip(&local_systems) {
            if let Some(system) = system {
                scatter_element_matrix(&mut coo, conn, &system.lhs);
                for i in 0..6 {
                    rhs[2 * conn[i / 2] + i % 2] += system.rhs[i];
                }
            }
        }

        Ok((CsrMatrix::from(&coo), rhs))
    }

    pub fn assemble_mass_matrix(&self, lumped: bool) -> eyre::Result<CsrMatrix<T>> {
        let element_matrices = self
            .elements
            .par_iter()
            .enumerate()
            .map(|(element_idx, element)| {
                element
                    .calculate_mass_matrix(lumped)
                    .wrap_err_with(|| format!("failed to compute mass matrix of element {}", element_idx))
            })
            .collect::<eyre::Result<Vec<_>>>()?;

        let n = self.num_dofs();
        let mut coo = CooMatrix::new(n, n);
        for (conn, matrix) in self.mesh.connectivity().iter().zip(&element_matrices) {
            scatter_element_matrix(&mut coo, conn, matrix);
        }
        Ok(CsrMatrix::from(&coo))
    }

    /// Commits the trial state of all elements. Must only be called between iterations.
    ///
    /// The published states belong to the converged step and are discarded.
    pub fn finalize_solution_step(&mut self) {
        self.states = None;
        let active_before = self.num_active_elements();
        self.elements
            .par_iter_mut()
            .for_each(|element| element.finalize_solution_step());
        let active_after = self.num_active_elements();
        if active_after < active_before {
            info!("{} elements fractured in this step", active_before - active_after);
        }
        debug!("{} of {} elements active", active_after, self.elements.len());
    }
}
